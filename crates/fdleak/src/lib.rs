//! fdleak: Catch file descriptor leaks by comparing snapshots.
//!
//! Take a snapshot of the process's open descriptors before an operation,
//! another after it, and ask whether they differ. Each snapshot also carries
//! a human-readable listing (which file, socket or pipe each descriptor
//! refers to) to help track down what leaked.
//!
//! ## Quick Start
//!
//! ```ignore
//! let before = fdleak::snapshot()?;
//! // ... operation under test ...
//! let after = fdleak::snapshot()?;
//!
//! if before.differs(&after) {
//!     eprintln!("leaks found!");
//!     eprintln!("fds open before:\n{}", before.describe());
//!     eprintln!("fds open after:\n{}", after.describe());
//! }
//! ```
//!
//! ## How it measures
//!
//! Listing `/proc/<pid>/fd` from inside the process would open a descriptor
//! on the directory and show up in its own result. Instead the listings are
//! produced by a child shell that writes to a scratch file, and the caller
//! holds nothing open while the child runs. See [`fdleak_runner`].
//!
//! ## Caveats
//!
//! - Results are only meaningful if nothing else in the process opens or
//!   closes descriptors while a snapshot is taken.
//! - Do not take two snapshots concurrently in one process.
//!
//! ## Features
//!
//! - `tokio` - [`snapshot_async`] and [`Snapshotter::take_async`]

mod error;
pub mod listing;
mod snapshot;
mod snapshotter;

pub use error::{Result, SnapshotError};
pub use listing::DetailTool;
pub use snapshot::Snapshot;
pub use snapshotter::{Snapshotter, snapshot};

#[cfg(feature = "tokio")]
pub use snapshotter::snapshot_async;

// Re-export the runner for callers that want the error details.
pub use fdleak_runner::{ChildStatus, RunError, Runner};
