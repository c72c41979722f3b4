//! Error types for fdleak.

use std::num::ParseIntError;

use fdleak_runner::RunError;
use thiserror::Error;

/// Error from taking a snapshot.
///
/// Runner failures are wrapped with the step that was running. The step is
/// the whole message; the runner error is reachable through `source()`, so a
/// reporter walking the chain prints "list open fds" then
/// "exec \"ls -1 /proc/…/fd\": child unexpectedly …".
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("list open fds")]
    ListDescriptors(#[source] RunError),

    #[error("detailed fd listing")]
    DetailedListing(#[source] RunError),

    #[error("list open fds: bad entry {entry:?}: {source}")]
    Parse {
        entry: String,
        source: ParseIntError,
    },

    /// The blocking task behind an async snapshot panicked or was cancelled.
    #[error("snapshot task: {0}")]
    Task(String),
}

impl SnapshotError {
    /// The runner failure underneath, if the error came from running a command.
    pub fn run_error(&self) -> Option<&RunError> {
        match self {
            SnapshotError::ListDescriptors(e) | SnapshotError::DetailedListing(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for fdleak operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;
