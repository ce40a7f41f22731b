//! Atomic JSON persistence.
//!
//! Writes go to a temp file in the target directory, are synced, then renamed
//! over the target. Readers see either the old file or the new one.

use crate::error::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Read and parse a JSON file.
///
/// `Ok(None)` when the file does not exist; a present but unreadable or
/// unparsable file is a [`StorageError::Read`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.is_file() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|e| StorageError::read(path, e))?;
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| StorageError::read(path, e))
}

/// Serialize `data` and atomically replace `path` with it.
///
/// Parent directories are created as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StorageError> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?;
    fs::create_dir_all(parent).map_err(|e| StorageError::write(parent, e))?;

    let serialized = serde_json::to_vec(data).map_err(|e| StorageError::write(path, e))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| StorageError::write(parent, e))?;
    temp.write_all(&serialized)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| StorageError::write(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| StorageError::write(path, e.error))?;
    Ok(())
}
