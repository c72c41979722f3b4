//! Snapshot acquisition.
//!
//! Taking a snapshot runs two commands through the constrained runner, one
//! after the other:
//!
//! 1. `ls -1 /proc/<pid>/fd` - parsed into sorted descriptor numbers
//! 2. the [`DetailTool`] - kept verbatim
//!
//! They never overlap, so at most one child is looking at the table at a
//! time and the runner's scratch file is never shared.
//!
//! ## Example
//!
//! ```ignore
//! use fdleak::{DetailTool, Snapshotter};
//!
//! let snapshotter = Snapshotter::new().detail_tool(DetailTool::Lsof);
//! let before = snapshotter.take()?;
//! // ... operation under test ...
//! let after = snapshotter.take()?;
//! if before.differs(&after) {
//!     eprintln!("fds before:\n{before}\nfds after:\n{after}");
//! }
//! ```

use fdleak_runner::Runner;

use crate::error::{Result, SnapshotError};
use crate::listing::{DetailTool, descriptor_command, parse_descriptors};
use crate::snapshot::Snapshot;

/// Takes snapshots of one process's descriptor table.
///
/// Not meant to be used from two threads at once in the same process: the
/// runner's scratch file is keyed to the process id only.
#[derive(Debug, Clone)]
pub struct Snapshotter {
    pid: u32,
    runner: Runner,
    detail_tool: DetailTool,
}

impl Default for Snapshotter {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshotter {
    /// Snapshotter for the calling process.
    pub fn new() -> Self {
        Self::for_pid(std::process::id())
    }

    /// Snapshotter keyed to an explicit process id.
    ///
    /// Only the calling process can meaningfully be measured; this exists so
    /// tests can drive the failure paths with an id that has no `/proc` entry.
    pub fn for_pid(pid: u32) -> Self {
        Self {
            pid,
            runner: Runner::new(pid),
            detail_tool: DetailTool::default(),
        }
    }

    pub fn detail_tool(mut self, tool: DetailTool) -> Self {
        self.detail_tool = tool;
        self
    }

    /// Shell the runner uses, by name or absolute path.
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.runner = self.runner.shell(shell);
        self
    }

    #[inline]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    #[inline]
    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Capture the descriptor table now.
    pub fn take(&self) -> Result<Snapshot> {
        let command = descriptor_command(self.pid);
        let output = self
            .runner
            .run(&command)
            .map_err(SnapshotError::ListDescriptors)?;
        let fds = parse_descriptors(&output)?;

        let command = self.detail_tool.command(self.pid);
        let listing = self
            .runner
            .run(&command)
            .map_err(SnapshotError::DetailedListing)?;

        tracing::debug!(pid = self.pid, open = fds.len(), "snapshot taken");
        Ok(Snapshot::new(fds, listing))
    }

    /// [`take`](Self::take) on tokio's blocking pool.
    ///
    /// The two listings still run one after the other; only the caller's
    /// task is freed up while they do.
    #[cfg(feature = "tokio")]
    pub async fn take_async(&self) -> Result<Snapshot> {
        let snapshotter = self.clone();
        tokio::task::spawn_blocking(move || snapshotter.take())
            .await
            .map_err(|e| SnapshotError::Task(e.to_string()))?
    }
}

/// Snapshot of the calling process with default settings.
pub fn snapshot() -> Result<Snapshot> {
    Snapshotter::new().take()
}

/// Async [`snapshot`].
#[cfg(feature = "tokio")]
pub async fn snapshot_async() -> Result<Snapshot> {
    Snapshotter::new().take_async().await
}
