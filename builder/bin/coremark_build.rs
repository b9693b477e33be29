// Licensed under the Apache-2.0 license

use std::path::PathBuf;

use anyhow::Context;
use cifer_coremark_builder::{
    build_all, BuildConfig, BuildContext, BuildOptions, CompileOptions, Isa,
};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Build CoreMark for the CIFER host (RV64) and device cores and package both
/// into a memory image.
#[derive(Debug, Parser)]
#[command(name = "coremark-build", version)]
struct Args {
    /// Enable DEBUG_PRINT in the host binary
    #[arg(long)]
    debug_print: bool,

    /// Benchmark iterations compiled into both binaries
    #[arg(long, default_value_t = 1)]
    iterations: u32,

    /// Build the device binary with the RV32 toolchain (the default)
    #[arg(long, default_value_t = true, conflicts_with = "device_rv64")]
    target_rv32: bool,

    /// Bring-up mode: build the device sources with the RV64 host toolchain
    #[arg(long)]
    device_rv64: bool,

    /// Generate core_main_rv32.h from the host symbol table before the device build
    #[arg(long)]
    gen_header: bool,

    /// TOML file overriding the built-in build settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// CIFER port directory holding core_main_rv64.c and the brg/ and
    /// ariane/ sources [default: the current working directory, so run from
    /// the port directory or pass this flag]
    #[arg(long, value_name = "DIR")]
    port_dir: Option<PathBuf>,

    /// Output directory [default: <port-dir>/build]
    #[arg(long, value_name = "DIR")]
    build_dir: Option<PathBuf>,

    /// Root of the piton verification tree
    #[arg(long, value_name = "DIR")]
    dv_root: Option<PathBuf>,

    /// Install directory for the image files
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Leave the image files in the build directory
    #[arg(long)]
    no_install: bool,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}
impl Args {
    fn build_config(&self) -> anyhow::Result<BuildConfig> {
        let mut config = match &self.config {
            Some(path) => BuildConfig::from_toml_file(path)?,
            None => BuildConfig::default(),
        };
        if let Some(dir) = &self.port_dir {
            config.port_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.build_dir {
            config.build_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.dv_root {
            config.dv_root = dir.clone();
        }
        if let Some(dir) = &self.image_dir {
            config.image_dir = Some(dir.clone());
        }
        Ok(config)
    }

    fn build_options(&self) -> BuildOptions {
        BuildOptions {
            compile: CompileOptions {
                iterations: self.iterations,
                debug_print: self.debug_print,
            },
            gen_header: self.gen_header,
            install: !self.no_install,
        }
    }

    fn device_isa(&self) -> Isa {
        if self.device_rv64 || !self.target_rv32 {
            Isa::Rv64
        } else {
            Isa::Rv32
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Could not get current directory")?;
    let ctx = BuildContext::new(args.build_config()?, &cwd, args.device_isa())?;
    log::info!("Port directory: {}", ctx.paths.port_dir.display());
    if ctx.device_isa == Isa::Rv64 {
        log::warn!("Device binary built for RV64; the BRG tiles cannot run this image");
    }
    let outputs = build_all(&ctx, &args.build_options())?;
    log::info!("Memory image written to {}", outputs.image.display());
    Ok(())
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = SimpleLogger::new().with_level(level).init();
    run(&args).unwrap_or_else(|e| {
        log::error!("Error: {e:#}");
        std::process::exit(1);
    });
}
