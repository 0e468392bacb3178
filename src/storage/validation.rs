//! Filename validation
//!
//! The served directory is flat: a requested name must refer to a direct
//! entry of the server root.

use crate::error::StorageError;
use std::path::{Path, PathBuf};

/// Rejects names that could escape the server root or name no entry at all.
pub fn validate_filename(filename: &str) -> Result<&str, StorageError> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        return Err(StorageError::InvalidName(filename.to_string()));
    }
    Ok(filename)
}

/// Joins a validated filename onto the server root.
pub fn resolve_file_path(server_root: &Path, filename: &str) -> Result<PathBuf, StorageError> {
    let name = validate_filename(filename)?;
    Ok(server_root.join(name))
}
