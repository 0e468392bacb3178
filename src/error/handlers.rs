//! Error handlers
//!
//! Maps domain errors to their wire reply and log level.

use crate::error::types::{ShareServerError, StorageError};
use crate::protocol::responses;
use log::{error, warn};

/// Log a storage error once, tagged with the command that hit it, and
/// return the reply the client receives for it
pub fn storage_error_response(operation: &str, err: &StorageError) -> &'static str {
    match err {
        StorageError::IoError(_) => error!("{} failed: {}", operation, err),
        _ => warn!("{} refused: {}", operation, err),
    }
    responses::FILE_UNKNOWN
}

/// Log an error that ended a session
pub fn handle_session_error(peer: &str, err: &ShareServerError) {
    error!("Session {} closed on error: {}", peer, err);
}
