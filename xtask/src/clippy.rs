// Licensed under the Apache-2.0 license

use anyhow::{bail, Result};
use log::info;
use std::process::Command;

use crate::PROJECT_ROOT;

pub(crate) fn clippy() -> Result<()> {
    info!("Running: cargo clippy");
    let status = Command::new("cargo")
        .current_dir(&*PROJECT_ROOT)
        .args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
        .status()?;

    if !status.success() {
        bail!("cargo clippy failed");
    }
    Ok(())
}
