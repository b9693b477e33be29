// Licensed under the Apache-2.0 license

use std::io;
use std::path::PathBuf;

use crate::config::BuildContext;
use crate::elf_symbols::{elf_symbols, find_symbol, Symbol};
use crate::fs;

/// Host globals the device code reaches through fixed addresses.
pub const SHARED_SYMBOLS: [&str; 7] = [
    "results",
    "static_memblk",
    "foo_seed1",
    "foo_seed2",
    "foo_seed3",
    "foo_size",
    "foo_iterations",
];

/// Renders `core_main_rv32.h` from the host symbol table.
pub fn rv32_header(symbols: &[Symbol]) -> io::Result<String> {
    let mut addrs = [0u32; SHARED_SYMBOLS.len()];
    for (addr, name) in addrs.iter_mut().zip(SHARED_SYMBOLS) {
        *addr = find_symbol(symbols, name)?.addr32();
    }
    let [results, static_memblk, seed1, seed2, seed3, size, iterations] = addrs;
    Ok(format!(
        "/** This file is generated */\n\
         #include \"coremark.h\"\n\
         core_results* results = (core_results*) {results:#010x}U;\n\
         ee_u8* static_memblk = (ee_u8*) {static_memblk:#010x}U;\n\
         ee_s16* foo_seed1      = (ee_s16*) {seed1:#010x};\n\
         ee_s16* foo_seed2      = (ee_s16*) {seed2:#010x};\n\
         ee_s16* foo_seed3      = (ee_s16*) {seed3:#010x};\n\
         ee_u32* foo_size       = (ee_u32*) {size:#010x};\n\
         ee_u32* foo_iterations = (ee_u32*) {iterations:#010x};\n"
    ))
}

/// Writes the device header next to the build outputs, where the device
/// compile picks it up. Requires the host binary.
pub fn gen_rv32_header(ctx: &BuildContext) -> io::Result<PathBuf> {
    let host_exe = ctx.paths.host_exe();
    fs::expect_file("RV64 binary", &host_exe)?;
    log::info!("Generating device header from {}", host_exe.display());

    let symbols = elf_symbols(&fs::read(&host_exe)?)?;
    let header = rv32_header(&symbols)?;
    let path = ctx.paths.device_header();
    fs::write(&path, header)?;
    Ok(path)
}
