//! Error types for modgraph operations.
//!
//! Errors fall into two groups:
//!
//! - **`Error`**: returned to the caller. Query failures (`ModuleNotFound`,
//!   `CycleDetected`) and persistence failures (`GraphVersionMismatch`,
//!   `InvalidSnapshot`) are typed so callers can branch on them.
//! - **`ParseFailure`**: a per-file problem collected during indexing. The
//!   file is still kept as a degraded module; indexing never aborts on one.
//!
//! `UnresolvedImport` is neither: it records an import that was dropped from
//! the edge set and is reported for information only.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for modgraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for modgraph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tree-sitter parsing infrastructure failed
    #[error("parser error: {0}")]
    Parser(String),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// The requested module key is not part of the graph.
    ///
    /// Distinct from a module that exists but has no dependents.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// The requested ordering contains a dependency cycle.
    #[error("dependency cycle detected: {}", .cycle.join(" -> "))]
    CycleDetected {
        /// Module keys forming one concrete cycle, in dependency order.
        cycle: Vec<String>,
    },

    /// A persisted snapshot was written by an incompatible format version.
    #[error("snapshot format version {found} does not match expected version {expected}")]
    GraphVersionMismatch {
        /// Version this build reads and writes.
        expected: u32,
        /// Version found in the snapshot.
        found: u32,
    },

    /// A persisted snapshot decoded but violates graph invariants.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// A file that could not be parsed normally.
///
/// The file is still present in the graph as a degraded module; this record
/// tells the caller why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Path to the file that failed (relative to the project root)
    pub path: PathBuf,
    /// Category of the failure
    pub kind: ParseFailureKind,
    /// Human-readable detail
    pub message: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.path.display(),
            self.message,
            self.kind
        )
    }
}

impl std::error::Error for ParseFailure {}

/// Categorization of parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailureKind {
    /// Could not read the file from disk
    Unreadable,

    /// File content is not valid UTF-8
    Encoding,

    /// Source has syntax errors
    Syntax,

    /// The grammar could not be loaded or produced no tree
    Grammar,
}

impl std::fmt::Display for ParseFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable => write!(f, "unreadable"),
            Self::Encoding => write!(f, "encoding error"),
            Self::Syntax => write!(f, "syntax error"),
            Self::Grammar => write!(f, "grammar error"),
        }
    }
}

impl ParseFailure {
    /// Create a new parse failure.
    #[must_use]
    pub fn new(path: PathBuf, kind: ParseFailureKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Create a failure for a file that could not be read.
    #[must_use]
    pub fn unreadable(path: PathBuf, error: &std::io::Error) -> Self {
        Self::new(path, ParseFailureKind::Unreadable, error.to_string())
    }

    /// Create a failure for a file that is not valid UTF-8.
    #[must_use]
    pub fn encoding(path: PathBuf) -> Self {
        Self::new(path, ParseFailureKind::Encoding, "file is not valid UTF-8")
    }

    /// Create a failure for a file with syntax errors.
    #[must_use]
    pub fn syntax(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(path, ParseFailureKind::Syntax, message)
    }
}

/// An internal import that could not be mapped to a module key.
///
/// Not part of the edge set. Reported so callers can see what the graph is
/// missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedImport {
    /// Key of the importing module
    pub from: String,
    /// The import specifier as written
    pub target: String,
    /// Why resolution failed
    pub reason: String,
}

impl std::fmt::Display for UnresolvedImport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} imports {}: {}", self.from, self.target, self.reason)
    }
}
