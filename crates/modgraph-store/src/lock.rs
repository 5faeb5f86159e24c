//! Single-writer lock for a project's snapshot.
//!
//! Indexing passes take this lock before writing. The lock is a sibling file
//! created with `create_new`, so a second writer fails fast with
//! [`Error::Locked`] instead of interleaving its write with the first one.
//! Readers never take the lock.

use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Held for the duration of one indexing pass; released on drop.
#[derive(Debug)]
pub struct SnapshotLock {
    path: PathBuf,
}

impl SnapshotLock {
    /// Acquires the writer lock for the snapshot at `snapshot_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] if another writer holds the lock, or an I/O
    /// error if the lock file cannot be created.
    pub async fn acquire(snapshot_path: &Path) -> Result<Self> {
        let path = lock_path_for(snapshot_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(Error::Locked(path)),
            Err(e) => return Err(e.into()),
        };
        file.write_all(std::process::id().to_string().as_bytes())
            .await?;
        file.flush().await?;

        debug!(lock = %path.display(), "Snapshot lock acquired");
        Ok(Self { path })
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "Failed to release snapshot lock");
        }
    }
}

fn lock_path_for(snapshot_path: &Path) -> PathBuf {
    let mut name = snapshot_path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".lock");
    snapshot_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_sits_next_to_snapshot() {
        let lock = lock_path_for(Path::new("/p/.modgraph/app.json"));
        assert_eq!(lock, Path::new("/p/.modgraph/app.json.lock"));
    }

    #[tokio::test]
    async fn second_acquire_fails_while_first_is_held() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("app.json");

        let first = SnapshotLock::acquire(&snapshot).await.unwrap();
        let second = SnapshotLock::acquire(&snapshot).await;

        assert!(matches!(second, Err(Error::Locked(_))));
        drop(first);
    }

    #[tokio::test]
    async fn lock_is_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("app.json");

        let lock = SnapshotLock::acquire(&snapshot).await.unwrap();
        let lock_file = lock.path().to_path_buf();
        drop(lock);

        assert!(!lock_file.exists());
        SnapshotLock::acquire(&snapshot).await.unwrap();
    }
}
