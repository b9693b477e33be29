// Licensed under the Apache-2.0 license

use std::io;
use std::path::PathBuf;
use std::process::Command;

use crate::config::BuildContext;
use crate::exec::exec;
use crate::target::TargetSpec;

/// Benchmark parameters baked in at compile time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompileOptions {
    pub iterations: u32,
    /// Host only: enables the progress `printf`s in `core_main_rv64.c`.
    pub debug_print: bool,
}
impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            debug_print: false,
        }
    }
}

fn arch_args(cmd: &mut Command, target: &TargetSpec) {
    cmd.arg(format!("-march={}", target.march))
        .arg(format!("-mabi={}", target.mabi))
        .arg("-static")
        .arg("-std=gnu99")
        .arg("-mcmodel=medany");
}

fn freestanding_exe_args(cmd: &mut Command) {
    cmd.arg("-fno-common")
        .arg("-nostdlib")
        .arg("-nostartfiles")
        .arg("-ffreestanding")
        .arg("-fno-builtin-printf")
        .arg("-ffp-contract=off");
}

/// Compiles the `syscalls.c` shim from `shim_dir` into `obj`.
fn syscalls_cmd(target: &TargetSpec, shim_dir: PathBuf, obj: PathBuf) -> Command {
    let mut cmd = target.toolchain.gcc();
    cmd.arg("-c").arg("-O2");
    arch_args(&mut cmd, target);
    cmd.arg("-nostdlib")
        .arg("-nostartfiles")
        .arg("-ffreestanding")
        .arg(format!("-I{}", shim_dir.display()))
        .arg(shim_dir.join("syscalls.c"))
        .arg("-o")
        .arg(obj);
    cmd
}

pub fn host_syscalls_cmd(ctx: &BuildContext) -> Command {
    syscalls_cmd(
        &ctx.host(),
        ctx.paths.ariane_dir(),
        ctx.paths.build_file("rv64_syscalls.o"),
    )
}

pub fn host_exe_cmd(ctx: &BuildContext, opts: &CompileOptions) -> Command {
    let paths = &ctx.paths;
    let host = &ctx.config.host;
    let ariane = paths.ariane_dir();

    let mut cmd = ctx.host().toolchain.gcc();
    cmd.arg("-O2");
    arch_args(&mut cmd, &ctx.host());
    freestanding_exe_args(&mut cmd);
    cmd.arg(format!("-I{}", ariane.display()))
        .arg(format!("-I{}", paths.port_dir.display()))
        .arg(format!("-I{}", paths.coremark_dir.display()))
        .arg(ariane.join("crt.S"))
        .arg(paths.build_file("rv64_syscalls.o"))
        .arg(paths.port_src("core_main_rv64.c"))
        .arg(paths.coremark_src("core_util.c"))
        .arg("-o")
        .arg(paths.host_exe())
        .args(["-lm", "-lgcc", "-T"])
        .arg(ariane.join("link.ld"))
        .arg("-DRV64_ARCH=1")
        .arg(format!("-DPITON_RV64_TILES={}", host.tiles))
        .arg(format!("-DPITON_RV64_X_TILES={}", host.x_tiles))
        .arg(format!("-DPITON_RV64_Y_TILES={}", host.y_tiles))
        .arg("-DPREALLOCATE=1")
        .arg(format!("-DITERATIONS={}", opts.iterations))
        .arg("-DFLAGS_STR=\"-O2\"")
        .arg(format!("-DTOTAL_DATA_SIZE={}", host.total_data_size));
    if opts.debug_print {
        cmd.arg("-DDEBUG_PRINT=1");
    }
    cmd
}

pub fn device_syscalls_cmd(ctx: &BuildContext) -> Command {
    syscalls_cmd(
        &ctx.device(),
        ctx.paths.brg_dir(),
        ctx.paths.build_file("rv32_syscalls.o"),
    )
}

pub fn device_exe_cmd(ctx: &BuildContext, opts: &CompileOptions) -> Command {
    let paths = &ctx.paths;
    let device = &ctx.config.device;
    let brg = paths.brg_dir();

    let mut cmd = ctx.device().toolchain.gcc();
    cmd.arg("-O2")
        .arg("-DRV32_ARCH=1")
        .arg(format!("-DITERATIONS={}", opts.iterations))
        .arg(format!("-DTOTAL_DATA_SIZE={}", device.total_data_size));
    arch_args(&mut cmd, &ctx.device());
    freestanding_exe_args(&mut cmd);
    cmd.arg(format!("-I{}", brg.display()))
        .arg(format!("-I{}", paths.build_dir.display()))
        .arg(format!("-I{}", paths.port_dir.display()))
        .arg(format!("-I{}", paths.coremark_dir.display()))
        .arg(brg.join("crt.S"))
        .arg(paths.build_file("rv32_syscalls.o"))
        .arg(paths.port_src("core_main_rv32.c"))
        .arg(paths.coremark_src("core_util.c"))
        .arg(paths.port_src("core_portme.c"))
        .arg(paths.coremark_src("core_list_join.c"))
        .arg(paths.coremark_src("core_state.c"))
        .arg(paths.coremark_src("core_matrix.c"))
        .arg("-o")
        .arg(paths.device_exe())
        .args(["-lm", "-lgcc", "-T"])
        .arg(brg.join("link.ld"))
        .args(&device.extra_cflags);
    cmd
}

/// Builds the host executable. Returns its path.
pub fn compile_rv64(ctx: &BuildContext, opts: &CompileOptions) -> io::Result<PathBuf> {
    log::info!("Compiling host binary ({} iterations)", opts.iterations);
    exec(host_syscalls_cmd(ctx).current_dir(&ctx.paths.build_dir))?;
    exec(host_exe_cmd(ctx, opts).current_dir(&ctx.paths.build_dir))?;
    Ok(ctx.paths.host_exe())
}

/// Builds the device executable. Returns its path.
pub fn compile_rv32(ctx: &BuildContext, opts: &CompileOptions) -> io::Result<PathBuf> {
    log::info!(
        "Compiling device binary for {:?} ({} iterations)",
        ctx.device_isa,
        opts.iterations
    );
    exec(device_syscalls_cmd(ctx).current_dir(&ctx.paths.build_dir))?;
    exec(device_exe_cmd(ctx, opts).current_dir(&ctx.paths.build_dir))?;
    Ok(ctx.paths.device_exe())
}
