//! Error types
//!
//! Defines the error types shared by the storage layer, the registry actors,
//! and the session handlers.

use std::fmt;
use std::io;

/// Served-directory errors
///
/// Every variant is answered on the wire with `FileUnknown`; none of them
/// closes the connection.
#[derive(Debug)]
pub enum StorageError {
    InvalidName(String),
    FileNotFound(String),
    NotAFile(String),
    Hidden(String),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidName(n) => write!(f, "Invalid filename: {}", n),
            StorageError::FileNotFound(n) => write!(f, "File not found: {}", n),
            StorageError::NotAFile(n) => write!(f, "Not a regular file: {}", n),
            StorageError::Hidden(n) => write!(f, "File is hidden: {}", n),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// General server error
///
/// Returned by session handlers; any of these ends the affected session only.
#[derive(Debug)]
pub enum ShareServerError {
    Storage(StorageError),
    IoError(io::Error),
    ProtocolError(String),
    RegistryUnavailable,
}

impl fmt::Display for ShareServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareServerError::Storage(e) => write!(f, "Storage error: {}", e),
            ShareServerError::IoError(e) => write!(f, "I/O error: {}", e),
            ShareServerError::ProtocolError(e) => write!(f, "Protocol error: {}", e),
            ShareServerError::RegistryUnavailable => write!(f, "Hidden registry is not running"),
        }
    }
}

impl std::error::Error for ShareServerError {}

impl From<StorageError> for ShareServerError {
    fn from(error: StorageError) -> Self {
        ShareServerError::Storage(error)
    }
}

impl From<io::Error> for ShareServerError {
    fn from(error: io::Error) -> Self {
        ShareServerError::IoError(error)
    }
}
