// Licensed under the Apache-2.0 license

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::BuildContext;
use crate::dump::write_dumps;
use crate::elf_symbols::elf_symbols;
use crate::exec::exec;
use crate::fs;
use crate::symbol_table::SymbolTable;
use crate::target::{Slot, TargetSpec};

/// Raw binaries are padded to a multiple of this many bytes.
pub const IMAGE_BLOCK: usize = 128;
/// Bytes of payload per image line.
pub const LINE_BYTES: usize = 32;
const GROUP_BYTES: usize = 8;

/// Appends `IMAGE_BLOCK - len % IMAGE_BLOCK` zero bytes. A binary that is
/// already block aligned still gains one full block of zeros; the deployed
/// images were produced this way.
pub fn pad_binary(bin: &mut Vec<u8>) {
    let pad = IMAGE_BLOCK - bin.len() % IMAGE_BLOCK;
    bin.resize(bin.len() + pad, 0);
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageSection {
    pub address: u64,
    pub comment: String,
    pub data: Vec<u8>,
}

/// Text memory image: each section is a blank line, an `@<address>` marker
/// with a comment, then the payload as lines of four 8-byte hex groups.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemImage {
    sections: Vec<ImageSection>,
}
impl MemImage {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, section: ImageSection) {
        self.sections.push(section);
    }
    pub fn sections(&self) -> &[ImageSection] {
        &self.sections
    }
}
impl fmt::Display for MemImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            write!(f, "\n@{:016x}\t// {}\n", section.address, section.comment)?;
            for line in section.data.chunks(LINE_BYTES) {
                let groups: Vec<String> = line.chunks(GROUP_BYTES).map(hex::encode).collect();
                writeln!(f, "{}", groups.join(" "))?;
            }
        }
        Ok(())
    }
}

/// Extracts the loadable contents of `exe` with objcopy into `raw_out`, pads
/// it, and returns the padded bytes. The padded file is left on disk.
pub fn raw_binary(target: &TargetSpec, exe: &Path, raw_out: &Path) -> io::Result<Vec<u8>> {
    exec(
        target
            .toolchain
            .objcopy()
            .arg("-I")
            .arg(target.isa.bfd_name())
            .arg("-O")
            .arg("binary")
            .arg(exe)
            .arg(raw_out),
    )?;
    let mut bin = fs::read(raw_out)?;
    pad_binary(&mut bin);
    fs::write(raw_out, &bin)?;
    Ok(bin)
}

/// Files produced by [`create_mem_image`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageOutputs {
    pub image: PathBuf,
    pub symbol_table: PathBuf,
    pub ev: PathBuf,
}
impl ImageOutputs {
    /// The files the verification environment consumes.
    pub fn installable(&self) -> [&Path; 3] {
        [&self.image, &self.symbol_table, &self.ev]
    }
}

/// Combines the device and host executables into the memory image, writes
/// the trap symbol table, the disassembly dumps and the `.ev` marker.
pub fn create_mem_image(ctx: &BuildContext) -> io::Result<ImageOutputs> {
    let paths = &ctx.paths;
    let host_exe = paths.host_exe();
    let device_exe = paths.device_exe();
    fs::expect_file("RV64 binary", &host_exe)?;
    fs::expect_file("RV32 binary", &device_exe)?;

    let stem = &ctx.config.output_name;
    log::info!("Creating memory image {stem}.image");

    let mut image = MemImage::new();
    for (slot, target, exe) in [
        (Slot::Device, ctx.device(), &device_exe),
        (Slot::Host, ctx.host(), &host_exe),
    ] {
        let data = raw_binary(&target, exe, &paths.build_file(slot.raw_binary_name()))?;
        image.push(ImageSection {
            address: slot.load_address(),
            comment: slot.image_comment().into(),
            data,
        });
    }
    let outputs = ImageOutputs {
        image: paths.build_file(format!("{stem}.image")),
        symbol_table: paths.build_file(format!("{stem}.tbl")),
        ev: paths.build_file(format!("{stem}.ev")),
    };
    fs::write(&outputs.image, image.to_string())?;

    let symbols = elf_symbols(&fs::read(&host_exe)?)?;
    fs::write(
        &outputs.symbol_table,
        SymbolTable::traps(&symbols)?.to_string(),
    )?;

    write_dumps(ctx)?;
    fs::write(&outputs.ev, b"")?;
    Ok(outputs)
}

/// Copies the image, symbol table and `.ev` file into `image_dir`.
pub fn install_image(outputs: &ImageOutputs, image_dir: &Path) -> io::Result<()> {
    for file in outputs.installable() {
        fs::copy_into(file, image_dir)?;
    }
    Ok(())
}
