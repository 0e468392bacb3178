//! Served-directory access
//!
//! Lists, checks and opens the files of the flat shared directory.

pub mod operations;
pub mod results;
pub mod validation;

pub use operations::{check_shared_file, list_files, open_for_retrieval};
pub use results::FileEntry;
pub use validation::validate_filename;
