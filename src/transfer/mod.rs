//! Transfer module
//!
//! Moves file bodies over the session stream.

pub mod file_ops;

pub use file_ops::{copy_exact, handle_file_download, receive_file};
