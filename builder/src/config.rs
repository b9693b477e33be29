// Licensed under the Apache-2.0 license

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fs;
use crate::other_err;
use crate::target::{Isa, TargetSpec, Toolchain};

pub const DEFAULT_DV_ROOT: &str = "/work/global/qtt2/cifer/cifer-chip-brg/cifer/piton";
pub const DEFAULT_OUTPUT_NAME: &str = "coremark_cifer_brg";

/// Build settings. Every field has a default, so a TOML file only needs the
/// values it changes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory holding the CIFER port sources (`core_main_rv64.c`, ...).
    /// Defaults to the current directory.
    pub port_dir: Option<PathBuf>,
    /// CoreMark checkout. Defaults to the parent of `port_dir`.
    pub coremark_dir: Option<PathBuf>,
    /// Defaults to `<port_dir>/build`.
    pub build_dir: Option<PathBuf>,
    /// Root of the piton design-verification tree.
    pub dv_root: PathBuf,
    /// Where the image is installed. Defaults to
    /// `<dv_root>/verif/diag/image/brg/coremark`.
    pub image_dir: Option<PathBuf>,
    /// File stem of the image, symbol table and `.ev` outputs.
    pub output_name: String,
    pub host: HostConfig,
    pub device: DeviceConfig,
}
impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            port_dir: None,
            coremark_dir: None,
            build_dir: None,
            dv_root: PathBuf::from(DEFAULT_DV_ROOT),
            image_dir: None,
            output_name: DEFAULT_OUTPUT_NAME.into(),
            host: HostConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}
impl BuildConfig {
    pub fn from_toml_str(s: &str) -> io::Result<Self> {
        toml::from_str(s).map_err(other_err)
    }

    pub fn from_toml_file(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let s = std::str::from_utf8(&bytes).map_err(other_err)?;
        Self::from_toml_str(s)
            .map_err(|e| other_err(format!("Invalid config file {}: {e}", path.display())))
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub tool_prefix: String,
    pub march: String,
    pub mabi: String,
    pub tiles: u32,
    pub x_tiles: u32,
    pub y_tiles: u32,
    pub total_data_size: u32,
}
impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tool_prefix: "riscv64-unknown-elf-".into(),
            march: "rv64imafdc".into(),
            mabi: "lp64d".into(),
            tiles: 4,
            x_tiles: 2,
            y_tiles: 2,
            total_data_size: 1200,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub tool_prefix: String,
    pub march: String,
    pub mabi: String,
    pub total_data_size: u32,
    /// Appended to the device compile command, after the linker script.
    pub extra_cflags: Vec<String>,
}
impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            tool_prefix: "riscv32-unknown-elf-".into(),
            march: "rv32imaf".into(),
            mabi: "ilp32f".into(),
            total_data_size: 2000,
            extra_cflags: vec![
                "-falign-functions=16".into(),
                "-falign-loops=16".into(),
                "-fif-conversion2".into(),
            ],
        }
    }
}

/// Concrete locations of every input and output of a build.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildPaths {
    pub port_dir: PathBuf,
    pub coremark_dir: PathBuf,
    pub build_dir: PathBuf,
    pub dv_root: PathBuf,
    pub image_dir: PathBuf,
}
impl BuildPaths {
    /// Fills in the directory defaults. `cwd` stands in for the port
    /// directory when none is configured.
    pub fn resolve(config: &BuildConfig, cwd: &Path) -> io::Result<Self> {
        let port_dir = match &config.port_dir {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        };
        let coremark_dir = match &config.coremark_dir {
            Some(dir) => cwd.join(dir),
            None => port_dir.parent().map(Path::to_path_buf).ok_or_else(|| {
                other_err(format!(
                    "Port directory {} has no parent; set coremark_dir",
                    port_dir.display()
                ))
            })?,
        };
        let build_dir = match &config.build_dir {
            Some(dir) => cwd.join(dir),
            None => port_dir.join("build"),
        };
        let image_dir = match &config.image_dir {
            Some(dir) => cwd.join(dir),
            None => config.dv_root.join("verif/diag/image/brg/coremark"),
        };
        Ok(Self {
            port_dir,
            coremark_dir,
            build_dir,
            dv_root: config.dv_root.clone(),
            image_dir,
        })
    }

    fn riscv_include(&self, flavor: &str) -> PathBuf {
        self.dv_root
            .join("verif/diag/assembly/include/riscv")
            .join(flavor)
    }
    /// Runtime shims (crt, syscalls, linker script) for the ariane host.
    pub fn ariane_dir(&self) -> PathBuf {
        self.riscv_include("ariane")
    }
    /// Runtime shims for the BRG device tiles.
    pub fn brg_dir(&self) -> PathBuf {
        self.riscv_include("brg")
    }

    pub fn port_src(&self, name: &str) -> PathBuf {
        self.port_dir.join(name)
    }
    pub fn coremark_src(&self, name: &str) -> PathBuf {
        self.coremark_dir.join(name)
    }
    pub fn build_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.build_dir.join(name)
    }

    pub fn host_exe(&self) -> PathBuf {
        self.build_file("coremark_rv64.exe")
    }
    pub fn device_exe(&self) -> PathBuf {
        self.build_file("coremark_rv32.exe")
    }
    pub fn device_header(&self) -> PathBuf {
        self.build_file("core_main_rv32.h")
    }
}

/// Resolved configuration shared by every build step.
#[derive(Clone, Debug)]
pub struct BuildContext {
    pub config: BuildConfig,
    pub paths: BuildPaths,
    /// ISA of the device binary. RV64 builds the device sources with the host
    /// toolchain, for bring-up without an RV32 compiler.
    pub device_isa: Isa,
}
impl BuildContext {
    pub fn new(config: BuildConfig, cwd: &Path, device_isa: Isa) -> io::Result<Self> {
        let paths = BuildPaths::resolve(&config, cwd)?;
        Ok(Self {
            config,
            paths,
            device_isa,
        })
    }

    pub fn host(&self) -> TargetSpec {
        let host = &self.config.host;
        TargetSpec {
            isa: Isa::Rv64,
            toolchain: Toolchain::new(&host.tool_prefix),
            march: host.march.clone(),
            mabi: host.mabi.clone(),
        }
    }

    pub fn device(&self) -> TargetSpec {
        match self.device_isa {
            Isa::Rv32 => {
                let dev = &self.config.device;
                TargetSpec {
                    isa: Isa::Rv32,
                    toolchain: Toolchain::new(&dev.tool_prefix),
                    march: dev.march.clone(),
                    mabi: dev.mabi.clone(),
                }
            }
            Isa::Rv64 => self.host(),
        }
    }
}
