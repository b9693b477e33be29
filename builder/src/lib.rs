// Licensed under the Apache-2.0 license

//! Builds CoreMark for the CIFER RV64 host and BRG device cores and packages
//! both binaries into a memory image for the piton verification environment.

use std::io::{self, ErrorKind};

pub mod compile;
pub mod config;
pub mod dump;
mod elf_symbols;
pub mod exec;
pub mod fs;
pub mod header;
pub mod mem_image;
pub mod symbol_table;
pub mod target;

#[cfg(test)]
mod testutil;

pub use compile::{compile_rv32, compile_rv64, CompileOptions};
pub use config::{BuildConfig, BuildContext, BuildPaths};
pub use elf_symbols::{elf_symbols, find_symbol, Symbol, SymbolType};
pub use header::gen_rv32_header;
pub use mem_image::{create_mem_image, install_image, ImageOutputs};
pub use target::Isa;

fn other_err(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> io::Error {
    io::Error::new(ErrorKind::Other, e)
}

/// Steps of a full build beyond the fixed compile and image stages.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BuildOptions {
    pub compile: CompileOptions,
    /// Regenerate `core_main_rv32.h` from the host binary before the device
    /// build.
    pub gen_header: bool,
    /// Copy the image files into the configured image directory.
    pub install: bool,
}

/// Runs the whole pipeline: host build, optional header generation, device
/// build, image creation and install.
pub fn build_all(ctx: &BuildContext, opts: &BuildOptions) -> io::Result<ImageOutputs> {
    fs::create_dir_all(&ctx.paths.build_dir)?;

    compile_rv64(ctx, &opts.compile)?;
    if opts.gen_header {
        gen_rv32_header(ctx)?;
    }
    compile_rv32(ctx, &opts.compile)?;
    let outputs = create_mem_image(ctx)?;

    if opts.install {
        install_image(&outputs, &ctx.paths.image_dir)?;
    } else {
        log::info!("Skipping install to {}", ctx.paths.image_dir.display());
    }
    Ok(outputs)
}
