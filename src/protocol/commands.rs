//! Module `commands`
//!
//! Defines the client commands of the sharing protocol and how a raw
//! command line is turned into one.

pub const LIST: &str = "List";
pub const GET: &str = "Get";
pub const HIDE: &str = "Hide";
pub const REVEAL: &str = "Reveal";
pub const TERMINATE: &str = "Terminate";
pub const END: &str = "End";

/// A command parsed from one client line.
///
/// Command words are case-sensitive. Only the first argument is kept;
/// filenames are single whitespace-delimited tokens.
#[derive(Debug, PartialEq)]
pub enum Command {
    List,
    Get(String),    // Download a file
    Hide(String),   // Control only
    Reveal(String), // Control only
    Terminate,      // Control only
    End,
    MissingArgument(&'static str), // Known command used without its filename
    Unknown(String),
}

/// What the session loop does after a command has been handled.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Continue,
    CloseConnection,
}

impl Command {
    /// Whether the command is only honoured on the control port
    pub fn is_control_only(&self) -> bool {
        matches!(
            self,
            Command::Hide(_) | Command::Reveal(_) | Command::Terminate
        ) || matches!(self, Command::MissingArgument(name) if *name != GET)
    }
}

/// Parses a raw command line into a `Command`.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let arg = parts.next();

    match (cmd, arg) {
        (LIST, _) => Command::List,
        (GET, Some(name)) => Command::Get(name.to_string()),
        (GET, None) => Command::MissingArgument(GET),
        (HIDE, Some(name)) => Command::Hide(name.to_string()),
        (HIDE, None) => Command::MissingArgument(HIDE),
        (REVEAL, Some(name)) => Command::Reveal(name.to_string()),
        (REVEAL, None) => Command::MissingArgument(REVEAL),
        (TERMINATE, _) => Command::Terminate,
        (END, _) => Command::End,
        _ => Command::Unknown(trimmed.to_string()),
    }
}
