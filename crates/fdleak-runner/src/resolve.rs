//! Shell path resolution.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("shell not found: {0}")]
    NotFound(String),
}

/// Resolve a shell name to an absolute path.
///
/// Absolute paths are taken as-is if they exist; bare names are looked up on
/// `PATH`.
pub fn resolve_shell(shell: &str) -> Result<PathBuf, ResolveError> {
    if shell.starts_with('/') {
        let path = PathBuf::from(shell);
        if !path.exists() {
            return Err(ResolveError::NotFound(shell.to_string()));
        }
        return Ok(path);
    }
    which::which(shell).map_err(|_| ResolveError::NotFound(shell.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_sh() {
        let path = resolve_shell("sh").unwrap();
        assert!(path.exists());
        assert!(path.is_absolute());
    }

    #[test]
    fn resolve_absolute() {
        assert_eq!(resolve_shell("/bin/sh").unwrap(), PathBuf::from("/bin/sh"));
    }

    #[test]
    fn resolve_nonexistent() {
        assert!(resolve_shell("nonexistent_shell_12345").is_err());
        assert!(resolve_shell("/nonexistent/bin/sh").is_err());
    }
}
