/*++

Licensed under the Apache-2.0 license.

File Name:

    fs.rs

Abstract:

    Filesystem helpers similar to std::fs but with errors that include the
    path involved.

--*/

use std::fmt::Debug;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Same as [`std::fs::create_dir_all`] but with more informative errors.
pub fn create_dir_all<P: AsRef<Path> + Debug>(path: P) -> io::Result<()> {
    std::fs::create_dir_all(&path)
        .map_err(|err| annotate_error(err, &format!("while creating dir {:?}", path)))
}

/// Same as [`std::fs::write`] but with more informative errors.
pub fn write<P: AsRef<Path> + Debug, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    log::debug!("Writing {:?}", path);
    std::fs::write(&path, contents)
        .map_err(|err| annotate_error(err, &format!("while writing to file {:?}", path)))
}

/// Same as [`std::fs::read`] but with more informative errors.
pub fn read<P: AsRef<Path> + Debug>(path: P) -> io::Result<Vec<u8>> {
    std::fs::read(&path)
        .map_err(|err| annotate_error(err, &format!("while reading from file {:?}", path)))
}

/// Copies `src` into the directory `dest_dir`, keeping its file name.
pub fn copy_into<P: AsRef<Path> + Debug, D: AsRef<Path> + Debug>(
    src: P,
    dest_dir: D,
) -> io::Result<PathBuf> {
    let file_name = src.as_ref().file_name().ok_or_else(|| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("{:?} has no file name", src),
        )
    })?;
    let dest = dest_dir.as_ref().join(file_name);
    log::info!("Copying {:?} to {:?}", src, dest_dir);
    std::fs::copy(&src, &dest).map_err(|err| {
        annotate_error(err, &format!("while copying {:?} to {:?}", src, dest))
    })?;
    Ok(dest)
}

/// Fails with [`ErrorKind::NotFound`] unless `path` is an existing file.
/// `what` describes the file in the error message.
pub fn expect_file(what: &str, path: &Path) -> io::Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(io::Error::new(
            ErrorKind::NotFound,
            format!("{what} ({}) doesn't exist", path.display()),
        ))
    }
}

/// A temporary directory that will be deleted (best-effort) when the
/// [`TempDir`] is dropped.
pub struct TempDir {
    path: PathBuf,
}
impl TempDir {
    /// Creates a new temporary directory in the system temp directory
    /// with a random name.
    pub fn new() -> io::Result<Self> {
        let path = Path::join(&std::env::temp_dir(), rand_str()?);
        std::fs::create_dir(&path)
            .map_err(|err| annotate_error(err, &format!("while creating dir {:?}", path)))?;
        Ok(Self { path })
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}
impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(self.path());
    }
}
impl Debug for TempDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.path, f)
    }
}
impl AsRef<Path> for TempDir {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

pub fn annotate_error(err: io::Error, suffix: &str) -> io::Error {
    io::Error::new(err.kind(), err.to_string() + ": " + suffix)
}

fn rand_str() -> io::Result<String> {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz123456";
    let mut buf = [0u8; 24];
    getrandom::getrandom(&mut buf).map_err(|err| {
        io::Error::new(
            ErrorKind::Other,
            format!("Unable to retrieve random data from OS: {err}"),
        )
    })?;
    Ok(buf
        .iter()
        .map(|b| char::from(CHARS[usize::from(b & 0x1f)]))
        .collect())
}
