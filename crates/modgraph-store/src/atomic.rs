//! Atomic replace-on-write for snapshot files.
//!
//! Snapshots are replaced with the temp-file-then-rename pattern:
//!
//! 1. The new bytes are written to a sibling file with a `.tmp` suffix
//! 2. The temporary file is flushed and synced to disk
//! 3. The temporary file is renamed over the target path
//!
//! Renames within one filesystem are atomic on POSIX systems, so a reader
//! sees either the previous snapshot or the new one, never a torn file.
//!
//! # Examples
//!
//! ```no_run
//! use modgraph_store::write_atomic;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! write_atomic(".modgraph/app.json", b"{}\n").await?;
//! # Ok(())
//! # }
//! ```

use crate::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Atomically replaces the file at `path` with `bytes`.
///
/// Missing parent directories are created. On failure the original file, if
/// any, is left untouched and the temporary file is removed on a best-effort
/// basis.
///
/// # Errors
///
/// Returns an error if the parent directory or temporary file cannot be
/// created, if writing or syncing fails, or if the final rename fails (for
/// example across filesystems).
pub async fn write_atomic<P>(path: P, bytes: &[u8]) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, bytes).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "Snapshot replaced");

    Ok(())
}

/// Serializes `value` as pretty JSON (with a trailing newline) and writes it
/// atomically to `path`.
///
/// # Errors
///
/// Returns an error if serialization fails or for any reason listed on
/// [`write_atomic`].
pub async fn write_json_atomic<T, P>(path: P, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    write_atomic(path, &bytes).await
}

/// Creates the temporary path used while replacing `path`.
///
/// `.tmp` is appended to the existing extension, or used as the extension
/// when the path has none.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

async fn write_to_temp_file(temp_path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(temp_path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}
