//! Input validation for runner commands.
//!
//! The runner does not escape or sanitize the command line it is given; the
//! caller builds a safe one. What it does reject is input that cannot be
//! handed to `execve` at all:
//!
//! - **Empty commands** - `sh -c ""` would succeed and capture nothing
//! - **Null bytes** - Cannot be represented in a C string
//!
//! ## Example
//!
//! ```ignore
//! use fdleak_runner::validate::validate_command;
//!
//! assert!(validate_command("ls -1 /proc/self/fd").is_ok());
//! assert!(validate_command("").is_err());
//! assert!(validate_command("ls\0").is_err());
//! ```

use thiserror::Error;

/// Validation error for runner inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("command cannot be empty")]
    EmptyCommand,

    #[error("null byte at offset {0}")]
    NullByte(usize),
}

/// Validate a shell command line before spawning it.
pub fn validate_command(command: &str) -> Result<(), ValidationError> {
    if command.trim().is_empty() {
        return Err(ValidationError::EmptyCommand);
    }
    if let Some(offset) = command.find('\0') {
        return Err(ValidationError::NullByte(offset));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_valid() {
        assert!(validate_command("ls -1 /proc/1/fd").is_ok());
    }

    #[test]
    fn command_empty() {
        assert_eq!(validate_command(""), Err(ValidationError::EmptyCommand));
        assert_eq!(validate_command("  \t"), Err(ValidationError::EmptyCommand));
    }

    #[test]
    fn command_null_byte() {
        assert_eq!(validate_command("ls\0-l"), Err(ValidationError::NullByte(2)));
    }
}
