//! Snapshot reading.
//!
//! Reads return raw bytes; decoding and format-version checks belong to the
//! engine, which owns the snapshot shape.

use crate::Result;
use std::io::ErrorKind;
use std::path::Path;

/// Reads the whole file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    Ok(tokio::fs::read(path).await?)
}

/// Reads the file at `path`, returning `None` if it does not exist.
///
/// # Errors
///
/// Returns an error for any I/O failure other than `NotFound`.
pub async fn read_bytes_if_exists<P: AsRef<Path>>(path: P) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
