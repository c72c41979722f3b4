//! Commands that produce the two listings, and parsing of the numeric one.
//!
//! | Listing | Command | Parsed |
//! |---------|---------|--------|
//! | descriptors | `ls -1 /proc/<pid>/fd` | yes, one number per line |
//! | detailed | [`DetailTool`] | no, kept verbatim |

use crate::error::SnapshotError;

/// Tool used to produce the human-readable listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTool {
    /// `pfiles(1)` on illumos and Solaris.
    Pfiles,
    /// `lsof(8)`, limited to one process, no name lookups.
    Lsof,
    /// `ls -l` of the procfs fd directory, which shows each link target.
    ProcLinks,
}

impl Default for DetailTool {
    fn default() -> Self {
        if cfg!(any(target_os = "illumos", target_os = "solaris")) {
            DetailTool::Pfiles
        } else {
            DetailTool::ProcLinks
        }
    }
}

impl DetailTool {
    pub fn command(self, pid: u32) -> String {
        match self {
            DetailTool::Pfiles => format!("pfiles {pid}"),
            DetailTool::Lsof => format!("lsof -n -P -p {pid}"),
            DetailTool::ProcLinks => format!("ls -l {}", fd_dir(pid)),
        }
    }

    /// Executable the command depends on.
    pub fn program(self) -> &'static str {
        match self {
            DetailTool::Pfiles => "pfiles",
            DetailTool::Lsof => "lsof",
            DetailTool::ProcLinks => "ls",
        }
    }
}

fn fd_dir(pid: u32) -> String {
    format!("/proc/{pid}/fd")
}

/// Command listing one descriptor number per line.
pub fn descriptor_command(pid: u32) -> String {
    format!("ls -1 {}", fd_dir(pid))
}

/// Parse the output of [`descriptor_command`] into sorted descriptor numbers.
///
/// Blank lines are skipped. Anything else that is not a number fails the
/// whole parse: a census with an entry we cannot read is not one to trust.
/// Duplicates are kept.
pub fn parse_descriptors(output: &str) -> Result<Vec<u32>, SnapshotError> {
    let mut fds = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<u32>().map_err(|source| SnapshotError::Parse {
                entry: line.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    fds.sort_unstable();
    Ok(fds)
}
