//! fdleak-runner: Run a shell command without touching the caller's fd table.
//!
//! Measuring a process's open descriptors by shelling out is only useful if
//! the act of shelling out leaves the table alone. This crate provides a
//! runner whose only footprint in the calling process is a short-lived read
//! of a scratch file after the child has already exited.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fdleak_runner::Runner;
//!
//! let listing = Runner::current().run("ls -1 /proc/self/fd")?;
//! ```
//!
//! ## Guarantees
//!
//! - stdin, stdout and stderr of the child are `/dev/null`
//! - the child is always reaped before `run` returns
//! - the scratch file (`/tmp/fdleak.<pid>`) is removed on every path
//! - no descriptor opened by `run` outlives the call
//!
//! ## Requirements
//!
//! - Unix with a POSIX shell on `PATH`
//! - One `run` in flight per process at a time

pub mod resolve;
pub mod runner;
pub mod scratch;
pub mod status;
pub mod validate;

pub use resolve::{ResolveError, resolve_shell};
pub use runner::{DEFAULT_SHELL, RunError, Runner};
pub use scratch::{SCRATCH_ROOT, scratch_path};
pub use status::{ChildStatus, signal_name};
pub use validate::ValidationError;

pub use nix::sys::signal::Signal;
