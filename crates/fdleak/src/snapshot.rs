//! Point-in-time record of a process's open descriptors.

use std::fmt;

/// Open descriptors of a process at one instant.
///
/// Only [`Snapshotter`](crate::Snapshotter) builds these, always with both
/// listings filled in, and nothing mutates one afterwards.
#[derive(Debug, Clone)]
pub struct Snapshot {
    fds: Vec<u32>,
    listing: String,
}

impl Snapshot {
    /// `fds` must already be sorted ascending.
    pub(crate) fn new(fds: Vec<u32>, listing: String) -> Self {
        debug_assert!(fds.is_sorted());
        Self { fds, listing }
    }

    /// Open descriptor numbers, ascending.
    #[inline]
    pub fn fds(&self) -> &[u32] {
        &self.fds
    }

    /// Whether the set of open descriptors differs from `other`.
    ///
    /// Compares the sorted sequences element by element. The detailed listing
    /// is not consulted; it names inodes, offsets and socket peers that can
    /// change while the descriptor set stays the same.
    pub fn differs(&self, other: &Snapshot) -> bool {
        self.fds != other.fds
    }

    /// The detailed listing, verbatim, for a human chasing a leak.
    #[inline]
    pub fn describe(&self) -> &str {
        &self.listing
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(fds: &[u32]) -> Snapshot {
        Snapshot::new(fds.to_vec(), format!("listing of {fds:?}\n"))
    }

    #[test]
    fn same_fds_do_not_differ() {
        let a = snap(&[0, 1, 2, 3]);
        let b = snap(&[0, 1, 2, 3]);
        assert!(!a.differs(&b));
        assert!(!a.differs(&a));
    }

    #[test]
    fn new_fd_differs() {
        let before = snap(&[0, 1, 2, 3]);
        let after = snap(&[0, 1, 2, 3, 4]);
        assert!(before.differs(&after));
        assert!(after.differs(&before));
    }

    #[test]
    fn same_count_different_numbers_differs() {
        assert!(snap(&[0, 1, 2, 5]).differs(&snap(&[0, 1, 2, 6])));
    }

    #[test]
    fn duplicates_are_significant() {
        assert!(snap(&[0, 1, 1]).differs(&snap(&[0, 1])));
    }

    #[test]
    fn listing_is_ignored() {
        let a = Snapshot::new(vec![0, 1, 2], "pipe:[100]\n".to_string());
        let b = Snapshot::new(vec![0, 1, 2], "pipe:[200]\n".to_string());
        assert!(!a.differs(&b));
    }

    #[test]
    fn describe_is_verbatim() {
        let listing = "0 -> /dev/pts/0\n1 -> /dev/pts/0\n";
        let s = Snapshot::new(vec![0, 1], listing.to_string());
        assert_eq!(s.describe(), listing);
        assert_eq!(s.to_string(), listing);
        assert_eq!(s.fds(), &[0, 1]);
    }
}
