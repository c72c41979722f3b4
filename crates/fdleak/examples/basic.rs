//! Bracket an operation with two snapshots and report any leak.
//!
//! Run with: cargo run -p fdleak --example basic

use std::fs::File;

fn main() {
    let before = match fdleak::snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("failed to check fd leaks: {e}");
            return;
        }
    };

    // The operation under test: this one forgets to close what it opens.
    let leaked = File::open("/etc/hostname").or_else(|_| File::open("/etc/passwd"));

    let after = match fdleak::snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("failed to check fd leaks: {e}");
            return;
        }
    };

    if before.differs(&after) {
        eprintln!("leaks found!");
        eprintln!("fds open before:");
        eprintln!("{}", before.describe());
        eprintln!("fds open after:");
        eprintln!("{}", after.describe());
    } else {
        eprintln!("no leaks found");
    }

    drop(leaked);
}
