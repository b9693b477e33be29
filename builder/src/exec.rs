/*++

Licensed under the Apache-2.0 license.

File Name:

    exec.rs

Abstract:

    Runs toolchain subprocesses. Every command is logged before it starts, and
    failures carry the full argument list plus the captured stderr.

--*/

use crate::fs::annotate_error;
use std::ffi::OsString;
use std::fmt;
use std::io::{self, ErrorKind, Write};
use std::process::{Command, Output, Stdio};

/// Runs `cmd` to completion, forwarding its stdout to ours.
///
/// If it fails, the error has a very descriptive error message that includes
/// stderr from the command along with all the arguments to command.
pub fn exec(cmd: &mut Command) -> io::Result<()> {
    let output = run(cmd, Stdio::inherit())?;
    io::stderr().write_all(&output.stderr)?;
    Ok(())
}

/// Like [`exec`], but captures and returns stdout instead of forwarding it.
pub fn exec_stdout(cmd: &mut Command) -> io::Result<Vec<u8>> {
    Ok(run(cmd, Stdio::piped())?.stdout)
}

/// Logs and runs `cmd` with stderr captured. A non-zero exit becomes an
/// [`ExecError`].
fn run(cmd: &mut Command, stdout: Stdio) -> io::Result<Output> {
    log::info!("$ {}", command_line(cmd));
    let output = cmd
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(Stdio::piped())
        .output()
        .map_err(|err| {
            annotate_error(
                err,
                &format!("while running command {:?}", collect_args(cmd)),
            )
        })?;
    if !output.status.success() {
        return Err(ExecError {
            code: output.status.code(),
            args: collect_args(cmd),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into_io_error());
    }
    Ok(output)
}

/// Renders a command the way a user would type it into a shell, for logging.
pub fn command_line(cmd: &Command) -> String {
    collect_args(cmd)
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct ExecError {
    /// The exit code of the subprocess. [`None`] if it was killed by a signal.
    code: Option<i32>,
    /// The arguments passed to the subprocess. `args[0]` will be the executable.
    args: Vec<OsString>,
    /// The captured stderr from the process, lossily converted to UTF-8.
    stderr: String,
}
impl ExecError {
    fn into_io_error(self) -> io::Error {
        io::Error::new(ErrorKind::Other, self)
    }
}
impl std::error::Error for ExecError {}
impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Subprocess exited with error {:?}: {:?}\n{}",
            self.code, self.args, self.stderr
        )
    }
}
impl fmt::Debug for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn collect_args(cmd: &Command) -> Vec<OsString> {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(OsString::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::TempDir;

    #[test]
    fn test_command_line() {
        let mut cmd = Command::new("riscv64-unknown-elf-gcc");
        cmd.arg("-O2").arg("-DFLAGS_STR=\"-O2\"").arg("foo.c");
        assert_eq!(
            command_line(&cmd),
            "riscv64-unknown-elf-gcc -O2 -DFLAGS_STR=\"-O2\" foo.c"
        );
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn test_exec_success() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("touched");
        assert!(!path.exists());
        exec(Command::new("touch").arg(&path)).unwrap();
        assert!(path.exists());
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn test_exec_process_not_found() {
        let result = exec(&mut Command::new("/tmp/pvoruxpa5dbnjv5sj5t15omn"));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err
            .to_string()
            .contains("while running command [\"/tmp/pvoruxpa5dbnjv5sj5t15omn\"]"));
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn test_exec_process_returned_nonzero() {
        let err = exec(Command::new("cat").arg("/tmp/pvoruxpa5dbnjv5sj5t15omn")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        let err = err.into_inner().unwrap().downcast::<ExecError>().unwrap();
        assert_eq!(err.code, Some(1));
        assert_eq!(
            &err.stderr,
            "cat: /tmp/pvoruxpa5dbnjv5sj5t15omn: No such file or directory\n"
        );
        assert_eq!(
            err.args,
            vec![
                OsString::from("cat"),
                OsString::from("/tmp/pvoruxpa5dbnjv5sj5t15omn")
            ]
        );
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn test_exec_stdout() {
        let out = exec_stdout(Command::new("sh").arg("-c").arg("printf 'a\\nb\\n'")).unwrap();
        assert_eq!(out, b"a\nb\n");

        let err = exec_stdout(Command::new("sh").arg("-c").arg("echo boom >&2; exit 3"))
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("Subprocess exited with error Some(3)"), "{err}");
        assert!(err.ends_with("boom\n"), "{err}");
    }
}
