//! Constrained command runner.
//!
//! Runs a single shell command and returns its stdout as text, without
//! leaving a single extra descriptor open in the calling process once the
//! call returns:
//!
//! - No pipe to the child: the shell redirects stdout into a scratch file.
//! - No pidfd: the child is tracked by PID and reaped with `waitpid`.
//! - `/dev/null` for the child's stdio is opened after `fork`, in the child.
//! - The scratch file is read with a handle scoped to the read, then removed.
//!
//! ## Example
//!
//! ```ignore
//! use fdleak_runner::Runner;
//!
//! let output = Runner::current().run("echo hello")?;
//! assert_eq!(output, "hello\n");
//! ```
//!
//! ## Concurrency
//!
//! The scratch file name is derived from the process id alone, so two `run`
//! calls in flight in one process would share it. Callers must not do that.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::unistd::Pid;
use thiserror::Error;

use crate::resolve::{ResolveError, resolve_shell};
use crate::scratch::{ScratchFile, scratch_path};
use crate::status::{ChildStatus, wait_for_exit};
use crate::validate::{ValidationError, validate_command};

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "sh";

/// Exit status of a child that could not set up its stdio.
const CHILD_SETUP_FAILED: i32 = 126;
/// Exit status of a child whose `execve` failed.
const EXEC_FAILED: i32 = 127;

/// Error from [`Runner::run`]. Every variant names the command it was running.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid command {command:?}: {source}")]
    Validation {
        command: String,
        source: ValidationError,
    },

    #[error("exec \"{command}\": {source}")]
    ShellNotFound {
        command: String,
        source: ResolveError,
    },

    #[error("exec \"{command}\": fork: {source}")]
    Spawn { command: String, source: Errno },

    #[error("exec \"{command}\": wait: {source}")]
    Wait { command: String, source: Errno },

    #[error("exec \"{command}\": child unexpectedly {status}")]
    ChildProcess { command: String, status: ChildStatus },

    #[error("read \"{}\": {source}", .path.display())]
    Read {
        command: String,
        path: PathBuf,
        source: io::Error,
    },
}

impl RunError {
    /// The command that failed.
    pub fn command(&self) -> &str {
        match self {
            RunError::Validation { command, .. }
            | RunError::ShellNotFound { command, .. }
            | RunError::Spawn { command, .. }
            | RunError::Wait { command, .. }
            | RunError::ChildProcess { command, .. }
            | RunError::Read { command, .. } => command,
        }
    }

    /// Termination status, if the child ran and failed.
    pub fn child_status(&self) -> Option<ChildStatus> {
        match self {
            RunError::ChildProcess { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Runs shell commands on behalf of one process.
///
/// The process id is only used to name the scratch file; it is a parameter
/// so tests can pick their own.
#[derive(Debug, Clone)]
pub struct Runner {
    pid: u32,
    shell: String,
}

impl Runner {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// Runner keyed to the calling process.
    pub fn current() -> Self {
        Self::new(std::process::id())
    }

    /// Shell to run commands through, by name or absolute path.
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    #[inline]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    #[inline]
    pub fn scratch_path(&self) -> PathBuf {
        scratch_path(self.pid)
    }

    /// Run `command` through the shell and return everything it wrote to stdout.
    pub fn run(&self, command: &str) -> Result<String, RunError> {
        validate_command(command).map_err(|source| RunError::Validation {
            command: command.to_string(),
            source,
        })?;

        let shell = resolve_shell(&self.shell).map_err(|source| RunError::ShellNotFound {
            command: command.to_string(),
            source,
        })?;

        let scratch = ScratchFile::new(self.scratch_path());
        let invocation = Invocation::new(&shell, command, scratch.path()).map_err(|e| {
            RunError::Validation {
                command: command.to_string(),
                source: ValidationError::NullByte(e.nul_position()),
            }
        })?;

        let child = invocation.spawn().map_err(|source| RunError::Spawn {
            command: command.to_string(),
            source,
        })?;
        tracing::debug!(child = child.as_raw(), command, "spawned");

        let status = wait_for_exit(child).map_err(|source| RunError::Wait {
            command: command.to_string(),
            source,
        })?;
        tracing::debug!(child = child.as_raw(), %status, "reaped");

        if !status.success() {
            return Err(RunError::ChildProcess {
                command: command.to_string(),
                status,
            });
        }

        scratch.read_to_string().map_err(|source| RunError::Read {
            command: command.to_string(),
            path: scratch.path().to_path_buf(),
            source,
        })
    }
}

/// Everything the child needs, built before `fork` so the child never allocates.
struct Invocation {
    shell: CString,
    argv: Vec<CString>,
    envp: Vec<CString>,
}

impl Invocation {
    fn new(shell: &Path, command: &str, scratch: &Path) -> Result<Self, std::ffi::NulError> {
        let shell = CString::new(shell.as_os_str().as_bytes())?;
        let script = CString::new(format!("{command} > {}", scratch.display()))?;
        let argv = vec![shell.clone(), CString::new("-c")?, script];

        let envp = std::env::vars_os()
            .filter_map(|(key, value)| {
                let mut entry = key.as_bytes().to_vec();
                entry.push(b'=');
                entry.extend_from_slice(value.as_bytes());
                CString::new(entry).ok()
            })
            .collect();

        Ok(Self { shell, argv, envp })
    }

    fn spawn(&self) -> Result<Pid, Errno> {
        let argv_ptrs: Vec<*const libc::c_char> = self
            .argv
            .iter()
            .map(|s| s.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();
        let envp_ptrs: Vec<*const libc::c_char> = self
            .envp
            .iter()
            .map(|s| s.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();

        let child = unsafe { libc::fork() };
        if child < 0 {
            return Err(Errno::last());
        }
        if child == 0 {
            // SAFETY: in the forked child; only async-signal-safe calls follow.
            unsafe { exec_child(&self.shell, &argv_ptrs, &envp_ptrs) }
        }
        Ok(Pid::from_raw(child))
    }
}

/// Child side: null stdio, drop inherited fds, exec the shell.
unsafe fn exec_child(
    shell: &CString,
    argv: &[*const libc::c_char],
    envp: &[*const libc::c_char],
) -> ! {
    unsafe {
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_RDWR);
        if devnull < 0 {
            libc::_exit(CHILD_SETUP_FAILED);
        }
        for target in 0..=2 {
            if libc::dup2(devnull, target) < 0 {
                libc::_exit(CHILD_SETUP_FAILED);
            }
        }
        if devnull > 2 {
            libc::close(devnull);
        }

        close_extra_fds();

        libc::execve(shell.as_ptr(), argv.as_ptr(), envp.as_ptr());
        libc::_exit(EXEC_FAILED)
    }
}

/// Close every descriptor above stderr. Best effort; older kernels lack `close_range`.
#[cfg(target_os = "linux")]
fn close_extra_fds() {
    // close_range(3, MAX, 0)
    unsafe { libc::syscall(libc::SYS_close_range, 3u32, u32::MAX, 0u32) };
}

#[cfg(not(target_os = "linux"))]
fn close_extra_fds() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_redirects_to_scratch() {
        let inv = Invocation::new(
            Path::new("/bin/sh"),
            "ls -1 /proc/7/fd",
            Path::new("/tmp/fdleak.7"),
        )
        .unwrap();
        assert_eq!(inv.shell.to_bytes(), b"/bin/sh");
        assert_eq!(inv.argv.len(), 3);
        assert_eq!(inv.argv[1].to_bytes(), b"-c");
        assert_eq!(inv.argv[2].to_bytes(), b"ls -1 /proc/7/fd > /tmp/fdleak.7");
    }

    #[test]
    fn runner_defaults() {
        let runner = Runner::new(7);
        assert_eq!(runner.pid(), 7);
        assert_eq!(runner.scratch_path(), PathBuf::from("/tmp/fdleak.7"));
        assert_eq!(Runner::current().pid(), std::process::id());
    }

    #[test]
    fn empty_command_rejected_before_spawn() {
        let err = Runner::new(u32::MAX - 21).run("").unwrap_err();
        assert!(matches!(
            err,
            RunError::Validation {
                source: ValidationError::EmptyCommand,
                ..
            }
        ));
    }

    #[test]
    fn missing_shell_is_spawn_failure() {
        let err = Runner::new(u32::MAX - 22)
            .shell("nonexistent_shell_12345")
            .run("echo hi")
            .unwrap_err();
        assert!(matches!(err, RunError::ShellNotFound { .. }));
        assert_eq!(err.command(), "echo hi");
        assert!(err.child_status().is_none());
    }
}
