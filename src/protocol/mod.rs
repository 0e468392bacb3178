//! Sharing protocol implementation
//!
//! Command parsing, reply formatting, line framing, and the command handlers.

pub mod commands;
pub mod framing;
pub mod handlers;
pub mod responses;

pub use commands::{Command, CommandStatus, parse_command};
pub use handlers::{
    handle_cmd_get, handle_cmd_hide, handle_cmd_list, handle_cmd_reveal, handle_cmd_terminate,
};
