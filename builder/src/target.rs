// Licensed under the Apache-2.0 license

use std::process::Command;

/// The RISC-V instruction set a binary is built for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Isa {
    Rv32,
    Rv64,
}
impl Isa {
    /// The BFD target name objcopy uses to read executables of this ISA.
    pub fn bfd_name(self) -> &'static str {
        match self {
            Isa::Rv32 => "elf32-littleriscv",
            Isa::Rv64 => "elf64-littleriscv",
        }
    }
}

/// Where a binary lives in the combined memory image.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot {
    /// The RV64 host core that boots and drives the benchmark.
    Host,
    /// The BRG device core that runs the CoreMark kernels.
    Device,
}
impl Slot {
    pub fn load_address(self) -> u64 {
        match self {
            Slot::Host => 0x8000_0000,
            Slot::Device => 0x4000_0000,
        }
    }
    pub fn image_comment(self) -> &'static str {
        match self {
            Slot::Host => "RV64 host code",
            Slot::Device => "RV32 test code",
        }
    }
    /// Name of the raw binary objcopy produces for this slot.
    pub fn raw_binary_name(self) -> &'static str {
        match self {
            Slot::Host => "diag_64.o",
            Slot::Device => "diag_32.o",
        }
    }
}

/// A GNU cross toolchain identified by its tool prefix, for example
/// `riscv64-unknown-elf-`. The prefix may include a directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Toolchain {
    pub prefix: String,
}
impl Toolchain {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
    pub fn gcc(&self) -> Command {
        self.tool("gcc")
    }
    pub fn objcopy(&self) -> Command {
        self.tool("objcopy")
    }
    pub fn objdump(&self) -> Command {
        self.tool("objdump")
    }
    fn tool(&self, name: &str) -> Command {
        Command::new(format!("{}{name}", self.prefix))
    }
}

/// Everything needed to compile and post-process one binary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetSpec {
    pub isa: Isa,
    pub toolchain: Toolchain,
    pub march: String,
    pub mabi: String,
}
