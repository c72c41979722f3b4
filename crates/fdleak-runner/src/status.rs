//! Child exit detection.
//!
//! The child is reaped with `waitpid` on its PID rather than through a pidfd:
//! a pidfd would sit in the caller's descriptor table for as long as the
//! child runs, and the child is usually listing that very table.
//!
//! The raw wait status is decoded with the libc macros, so a child killed by
//! any signal (realtime ones included) is reported as such:
//!
//! - `WIFEXITED` - Normal exit with exit code
//! - `WIFSIGNALED` - Killed by signal

use std::borrow::Cow;
use std::fmt;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::unistd::Pid;

/// How a child process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    /// Exited normally with the given status code.
    Exited(i32),
    /// Terminated by an uncaught signal, by number.
    Signaled(i32),
}

impl ChildStatus {
    #[inline]
    pub fn success(self) -> bool {
        self == ChildStatus::Exited(0)
    }

    #[inline]
    pub fn code(self) -> Option<i32> {
        match self {
            ChildStatus::Exited(code) => Some(code),
            ChildStatus::Signaled(_) => None,
        }
    }

    #[inline]
    pub fn signal(self) -> Option<i32> {
        match self {
            ChildStatus::Exited(_) => None,
            ChildStatus::Signaled(signo) => Some(signo),
        }
    }
}

impl fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildStatus::Exited(code) => write!(f, "exited with status {code}"),
            ChildStatus::Signaled(signo) => {
                write!(f, "terminated by signal {}", signal_name(*signo))
            }
        }
    }
}

/// Symbolic name for a signal number: `SIGKILL`, `SIGRTMIN+6`, or `SIG<n>`.
pub fn signal_name(signo: i32) -> Cow<'static, str> {
    if let Ok(signal) = Signal::try_from(signo) {
        return Cow::Borrowed(signal.as_str());
    }
    #[cfg(any(target_os = "linux", target_os = "android"))]
    if (libc::SIGRTMIN()..=libc::SIGRTMAX()).contains(&signo) {
        return Cow::Owned(format!("SIGRTMIN+{}", signo - libc::SIGRTMIN()));
    }
    Cow::Owned(format!("SIG{signo}"))
}

/// Block until `pid` terminates and reap it.
pub fn wait_for_exit(pid: Pid) -> Result<ChildStatus, Errno> {
    let mut status: libc::c_int = 0;
    loop {
        let ret = unsafe { libc::waitpid(pid.as_raw(), &mut status, 0) };
        if ret < 0 {
            match Errno::last() {
                Errno::EINTR => continue,
                e => return Err(e),
            }
        }
        if libc::WIFEXITED(status) {
            return Ok(ChildStatus::Exited(libc::WEXITSTATUS(status)));
        }
        if libc::WIFSIGNALED(status) {
            return Ok(ChildStatus::Signaled(libc::WTERMSIG(status)));
        }
        // Stop/continue notifications are not requested, but are not terminal either.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_success() {
        assert!(ChildStatus::Exited(0).success());
        assert!(!ChildStatus::Exited(2).success());
        assert!(!ChildStatus::Signaled(libc::SIGKILL).success());
    }

    #[test]
    fn status_accessors() {
        assert_eq!(ChildStatus::Exited(2).code(), Some(2));
        assert_eq!(ChildStatus::Exited(2).signal(), None);
        assert_eq!(ChildStatus::Signaled(libc::SIGTERM).code(), None);
        assert_eq!(
            ChildStatus::Signaled(libc::SIGTERM).signal(),
            Some(libc::SIGTERM)
        );
    }

    #[test]
    fn status_display() {
        assert_eq!(ChildStatus::Exited(2).to_string(), "exited with status 2");
        assert_eq!(
            ChildStatus::Signaled(libc::SIGKILL).to_string(),
            "terminated by signal SIGKILL"
        );
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn realtime_signal_names() {
        let base = libc::SIGRTMIN();
        assert_eq!(signal_name(base), "SIGRTMIN+0");
        assert_eq!(signal_name(base + 6), "SIGRTMIN+6");
        assert_eq!(
            ChildStatus::Signaled(base + 6).to_string(),
            "terminated by signal SIGRTMIN+6"
        );
    }

    #[test]
    fn unknown_signal_number_is_named_by_number() {
        assert_eq!(signal_name(200), "SIG200");
    }
}
