//! Scratch file used to carry a child's output back to the runner.
//!
//! The child's stdout is redirected by the shell into a file named after the
//! caller's process id, so the caller never holds a pipe to the child while
//! it runs. Once the child has been reaped the runner opens the file, reads
//! it in one go and closes it again.
//!
//! ## Naming
//!
//! `/tmp/fdleak.<pid>`. The root is fixed: `TMPDIR` is not consulted because
//! the path ends up on a shell command line, and the name contains only
//! digits beyond the fixed prefix.
//!
//! ## Cleanup
//!
//! [`ScratchFile`] removes the file when dropped, on every path out of
//! [`Runner::run`](crate::Runner::run). Removal errors are logged and
//! otherwise ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory scratch files are created in.
pub const SCRATCH_ROOT: &str = "/tmp";

/// File name prefix shared by every scratch file.
pub const SCRATCH_PREFIX: &str = "fdleak";

/// Scratch file path for the given process id.
pub fn scratch_path(pid: u32) -> PathBuf {
    Path::new(SCRATCH_ROOT).join(format!("{SCRATCH_PREFIX}.{pid}"))
}

/// Owns a scratch path for the duration of one run and removes it on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file as text.
    ///
    /// The file handle lives only inside this call, so it is closed before
    /// returning whether or not the read succeeds.
    pub fn read_to_string(&self) -> io::Result<String> {
        let bytes = fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "scratch file not removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_from_pid() {
        assert_eq!(scratch_path(4242), PathBuf::from("/tmp/fdleak.4242"));
    }

    #[test]
    fn removed_on_drop() {
        let path = scratch_path(u32::MAX - 11);
        fs::write(&path, b"0\n1\n2\n").unwrap();
        {
            let scratch = ScratchFile::new(&path);
            assert_eq!(scratch.read_to_string().unwrap(), "0\n1\n2\n");
        }
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_read_error() {
        let scratch = ScratchFile::new(scratch_path(u32::MAX - 12));
        let err = scratch.read_to_string().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let path = scratch_path(u32::MAX - 13);
        fs::write(&path, b"socket:[\xff]\n").unwrap();
        let scratch = ScratchFile::new(&path);
        assert_eq!(scratch.read_to_string().unwrap(), "socket:[\u{fffd}]\n");
    }
}
