//! Client sessions
//!
//! One session per accepted connection, owning its stream until it closes.

pub mod control;
pub mod data;

pub use control::ControlSession;
pub use data::DataSession;

use std::fmt;

/// Which port a session was accepted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    Data,
    Control,
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionRole::Data => write!(f, "data"),
            SessionRole::Control => write!(f, "control"),
        }
    }
}
