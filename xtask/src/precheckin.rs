// Licensed under the Apache-2.0 license

use anyhow::{bail, Result};
use log::info;
use std::process::Command;

use crate::PROJECT_ROOT;

pub(crate) fn precheckin() -> Result<()> {
    crate::clippy::clippy()?;
    test()?;
    Ok(())
}

fn test() -> Result<()> {
    info!("Running: cargo test");
    let status = Command::new("cargo")
        .current_dir(&*PROJECT_ROOT)
        .args(["test", "--workspace"])
        .status()?;

    if !status.success() {
        bail!("cargo test failed");
    }
    Ok(())
}
