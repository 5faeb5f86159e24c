//! Content hashing and staleness checks.
//!
//! A record is stale when the SHA-256 of the file's current bytes differs
//! from the hash stored at indexing time. Bytes are hashed exactly as read:
//! a whitespace-only edit makes a record stale. Staleness is advisory and is
//! always computed on demand.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::IndexOptions;
use crate::discovery::discover;
use crate::error::Result;
use crate::graph::Graph;

/// SHA-256 of `bytes` as lowercase hex.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        // Writing to a String cannot fail.
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Whether `bytes` no longer match `stored_hash`.
#[must_use]
pub fn is_stale(stored_hash: &str, bytes: &[u8]) -> bool {
    content_hash(bytes) != stored_hash
}

/// How a graph differs from the tree on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleReport {
    /// Indexed modules whose content changed
    pub modified: Vec<String>,
    /// Source files not present in the graph
    pub added: Vec<String>,
    /// Indexed modules whose file is gone
    pub deleted: Vec<String>,
}

impl StaleReport {
    /// Whether the graph still matches the tree.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty() && self.deleted.is_empty()
    }

    /// Total number of changed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modified.len() + self.added.len() + self.deleted.len()
    }

    /// Same as [`StaleReport::is_clean`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_clean()
    }
}

/// Compare every module in `graph` against the files under `root`.
///
/// All three lists are sorted.
///
/// # Errors
///
/// Returns an error if `root` cannot be walked.
pub fn stale_report(graph: &Graph, root: &Path, options: &IndexOptions) -> Result<StaleReport> {
    let mut report = StaleReport::default();

    for module in graph.modules() {
        match std::fs::read(root.join(&module.path)) {
            Ok(bytes) => {
                if is_stale(&module.content_hash, &bytes) {
                    report.modified.push(module.path.clone());
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                report.deleted.push(module.path.clone());
            }
            Err(e) => {
                warn!(file = %module.path, error = %e, "Cannot read file, treating as modified");
                report.modified.push(module.path.clone());
            }
        }
    }

    let discovery = discover(root, options)?;
    report.added = discovery
        .files
        .into_iter()
        .filter(|file| !graph.contains(&file.key))
        .map(|file| file.key)
        .collect();

    debug!(
        modified = report.modified.len(),
        added = report.added.len(),
        deleted = report.deleted.len(),
        "Staleness check complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_lowercase_hex_sha256() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn identical_bytes_are_fresh() {
        let stored = content_hash(b"def f():\n    pass\n");
        assert!(!is_stale(&stored, b"def f():\n    pass\n"));
    }

    #[test]
    fn whitespace_only_change_is_stale() {
        let stored = content_hash(b"x = 1\n");
        assert!(is_stale(&stored, b"x = 1 \n"));
        assert!(is_stale(&stored, b"x = 1\r\n"));
    }

    #[test]
    fn report_is_clean_when_empty() {
        let report = StaleReport::default();
        assert!(report.is_clean());
        assert_eq!(report.len(), 0);
    }
}
