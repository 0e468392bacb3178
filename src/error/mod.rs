//! Error handling
//!
//! Defines error types and handling for the file-sharing server.

pub mod handlers;
pub mod types;

pub use types::*;
