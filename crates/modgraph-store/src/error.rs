//! Error types for modgraph-store operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for snapshot persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another writer already holds the lock for this snapshot.
    #[error("snapshot is locked by another writer: {}", .0.display())]
    Locked(PathBuf),
}

/// A specialized Result type for modgraph-store operations.
pub type Result<T> = std::result::Result<T, Error>;
