//! Server core functionality
//!
//! This module contains the listeners, the shutdown coordinator, and the
//! state shared by all sessions.

pub mod core;
pub mod listener;
pub mod shutdown;
pub mod state;

pub use self::core::Server;
pub use shutdown::{DrainOutcome, ShutdownCoordinator};
pub use state::ServerState;
