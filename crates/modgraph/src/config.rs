//! Indexing and cache configuration.
//!
//! Every field has a serde default so a partial `modgraph.yaml` (or none at
//! all) yields a usable configuration.

use serde::{Deserialize, Serialize};

use crate::types::Language;

/// Default LRU capacity for the transitive-dependency cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Directory names never descended into during discovery.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "target",
    "node_modules",
    "vendor",
    "build",
    "dist",
    "__pycache__",
    "venv",
    "site-packages",
];

/// Options controlling one indexing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Directory names to skip, matched against a single path component
    pub exclude_dirs: Vec<String>,
    /// Root-relative directories that absolute imports are resolved under.
    /// The empty string is the project root itself.
    pub source_roots: Vec<String>,
    /// Restrict indexing to these languages; empty means all of them
    pub languages: Vec<Language>,
    /// Descend into directories whose name starts with `.`
    pub follow_hidden: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(ToString::to_string)
                .collect(),
            source_roots: vec![String::new(), "src".to_string(), "lib".to_string()],
            languages: Vec::new(),
            follow_hidden: false,
        }
    }
}

impl IndexOptions {
    /// Restrict indexing to a single language.
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.languages = vec![language];
        self
    }

    /// Whether files of `language` should be indexed.
    #[must_use]
    pub fn includes_language(&self, language: Language) -> bool {
        self.languages.is_empty() || self.languages.contains(&language)
    }

    /// Whether a directory named `name` should be skipped.
    #[must_use]
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        (!self.follow_hidden && name.starts_with('.'))
            || self.exclude_dirs.iter().any(|d| d == name)
    }
}

/// Options for [`crate::DependencyCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Maximum number of memoized closures
    pub capacity: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
