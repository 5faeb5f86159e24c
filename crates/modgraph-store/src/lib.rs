//! Crash-safe persistence for modgraph snapshots.
//!
//! The engine hands a serialized snapshot across this boundary; this crate
//! only guarantees that readers never observe a partially written file and
//! that at most one writer holds a project's snapshot at a time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod lock;
pub mod reader;

pub use atomic::{write_atomic, write_json_atomic};
pub use error::{Error, Result};
pub use lock::SnapshotLock;
pub use reader::{read_bytes, read_bytes_if_exists};

use std::path::{Path, PathBuf};

/// Name of the directory holding snapshots inside a project root.
pub const STORE_DIR_NAME: &str = ".modgraph";

/// Default snapshot location for a project: `<root>/.modgraph/<project>.json`.
#[must_use]
pub fn default_snapshot_path(root: &Path, project: &str) -> PathBuf {
    root.join(STORE_DIR_NAME).join(format!("{project}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_path_lives_under_store_dir() {
        let path = default_snapshot_path(Path::new("/work/app"), "app");
        assert_eq!(path, Path::new("/work/app/.modgraph/app.json"));
    }
}
