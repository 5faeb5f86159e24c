//! Source file discovery.
//!
//! Walks a project tree and returns every file with a supported extension,
//! keyed by its root-relative path. Directory entries are visited in name
//! order and the result is sorted by key, so two walks over the same tree
//! agree exactly. Symlinks are not followed.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::IndexOptions;
use crate::error::{Error, Result};
use crate::types::Language;

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Root-relative path with `/` separators
    pub key: String,
    /// Language inferred from the extension
    pub language: Language,
}

/// Result of walking a project tree.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Source files, sorted by key
    pub files: Vec<SourceFile>,
    /// Directories that could not be read, with the reason
    pub dirs_skipped: Vec<(PathBuf, String)>,
    /// Files skipped because their path is not valid UTF-8
    pub files_skipped: Vec<PathBuf>,
}

/// Discover source files under `root`.
///
/// # Errors
///
/// Returns [`Error::Config`] if `root` is not a directory. Unreadable
/// subdirectories are recorded in [`Discovery::dirs_skipped`], not errors.
pub fn discover(root: &Path, options: &IndexOptions) -> Result<Discovery> {
    if !root.is_dir() {
        return Err(Error::Config(format!(
            "project root is not a directory: {}",
            root.display()
        )));
    }

    let mut discovery = Discovery::default();
    walk_dir(root, "", options, &mut discovery);
    discovery.files.sort();

    debug!(
        root = %root.display(),
        files = discovery.files.len(),
        dirs_skipped = discovery.dirs_skipped.len(),
        "Discovery complete"
    );
    Ok(discovery)
}

/// Recursively walk a directory, collecting source files.
///
/// `prefix` is the key of `dir` relative to the project root.
fn walk_dir(dir: &Path, prefix: &str, options: &IndexOptions, discovery: &mut Discovery) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(
                directory = %dir.display(),
                error = %e,
                "Cannot read directory, skipping"
            );
            discovery.dirs_skipped.push((dir.to_path_buf(), e.to_string()));
            return;
        }
    };

    let mut entries: Vec<_> = entries
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(
                    directory = %dir.display(),
                    error = %e,
                    "Failed to read directory entry, skipping"
                );
                None
            }
        })
        .collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(ToString::to_string) else {
            warn!(path = %path.display(), "Path is not valid UTF-8, skipping");
            discovery.files_skipped.push(path);
            continue;
        };
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };

        if file_type.is_dir() {
            if options.is_excluded_dir(&name) {
                continue;
            }
            walk_dir(&path, &key, options, discovery);
        } else if file_type.is_file() {
            if let Some(language) = Language::from_path(&path) {
                if options.includes_language(language) {
                    discovery.files.push(SourceFile { key, language });
                }
            }
        }
    }
}
