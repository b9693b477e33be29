// Licensed under the Apache-2.0 license

use std::io;
use std::path::Path;
use std::process::Command;

use crate::config::BuildContext;
use crate::exec::exec_stdout;
use crate::fs;
use crate::target::TargetSpec;

const DUMP_SECTIONS: [&str; 4] = [".text", ".text.startup", ".text.init", ".data"];

/// Full disassembly of the code and data sections, zeros included.
pub fn disassemble_all_cmd(target: &TargetSpec, exe: &Path) -> Command {
    let mut cmd = target.toolchain.objdump();
    cmd.arg("-d")
        .arg(exe)
        .arg("--disassemble-all")
        .arg("--disassemble-zeroes");
    for section in DUMP_SECTIONS {
        cmd.arg(format!("--section={section}"));
    }
    cmd
}

/// Disassembly with demangled names.
pub fn disassemble_cmd(target: &TargetSpec, exe: &Path) -> Command {
    let mut cmd = target.toolchain.objdump();
    cmd.arg("-dC").arg(exe);
    cmd
}

/// Writes `diag.dump` (device then host) and the per-binary
/// `rv32_<name>.S` / `rv64_<name>.S` listings into the build directory.
pub fn write_dumps(ctx: &BuildContext) -> io::Result<()> {
    let paths = &ctx.paths;
    let stem = &ctx.config.output_name;
    let (host, device) = (ctx.host(), ctx.device());
    let (host_exe, device_exe) = (paths.host_exe(), paths.device_exe());

    let mut diag = exec_stdout(&mut disassemble_all_cmd(&device, &device_exe))?;
    diag.extend(exec_stdout(&mut disassemble_all_cmd(&host, &host_exe))?);
    fs::write(paths.build_file("diag.dump"), diag)?;

    fs::write(
        paths.build_file(format!("rv32_{stem}.S")),
        exec_stdout(&mut disassemble_cmd(&device, &device_exe))?,
    )?;
    fs::write(
        paths.build_file(format!("rv64_{stem}.S")),
        exec_stdout(&mut disassemble_cmd(&host, &host_exe))?,
    )?;
    Ok(())
}
