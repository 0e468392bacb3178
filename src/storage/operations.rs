//! Storage operations
//!
//! Reads the served directory for the List, Get, Hide and Reveal commands.

use log::{debug, warn};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{self, File};

use crate::error::StorageError;
use crate::storage::results::FileEntry;
use crate::storage::validation::resolve_file_path;

/// Lists the regular files directly under `server_root`, minus the `hidden` names.
///
/// Entries whose metadata cannot be read are left out, so the returned
/// length is always the number of lines a listing will carry.
pub async fn list_files(
    server_root: &Path,
    hidden: &HashSet<String>,
) -> Result<Vec<FileEntry>, StorageError> {
    let mut entries = fs::read_dir(server_root).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if hidden.contains(&name) {
            continue;
        }

        // Follows symlinks so a link to a directory is skipped as well
        match fs::metadata(entry.path()).await {
            Ok(metadata) if metadata.is_dir() => continue,
            Ok(metadata) => files.push(FileEntry {
                name,
                size: metadata.len(),
            }),
            Err(e) => {
                warn!("Could not stat file {}: {}", name, e);
            }
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(
        "Listed {} ({} files, {} hidden names)",
        server_root.display(),
        files.len(),
        hidden.len()
    );
    Ok(files)
}

/// Checks that `filename` is an existing regular file of the served directory
/// and returns its size.
pub async fn check_shared_file(server_root: &Path, filename: &str) -> Result<u64, StorageError> {
    let path = resolve_file_path(server_root, filename)?;

    let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StorageError::FileNotFound(filename.to_string()));
        }
        Err(e) => return Err(StorageError::IoError(e)),
    };

    if metadata.is_dir() {
        return Err(StorageError::NotAFile(filename.to_string()));
    }

    Ok(metadata.len())
}

/// Opens a shared file for download, returning it with its size.
pub async fn open_for_retrieval(
    server_root: &Path,
    filename: &str,
) -> Result<(File, u64), StorageError> {
    check_shared_file(server_root, filename).await?;
    let path = resolve_file_path(server_root, filename)?;

    let file = File::open(&path).await?;
    // Size of what was actually opened, in case the entry changed since the check
    let metadata = file.metadata().await?;
    if metadata.is_dir() {
        return Err(StorageError::NotAFile(filename.to_string()));
    }

    Ok((file, metadata.len()))
}
