//! Data session
//!
//! Serves one unprivileged client: List, Get and End. The command read is
//! bounded by the idle timeout so the loop regularly comes back to check the
//! shutdown flag; once the flag is seen, no further command is dispatched.

use log::{debug, info, warn};
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, BufWriter};
use tokio::net::TcpStream;

use crate::error::ShareServerError;
use crate::error::handlers::handle_session_error;
use crate::protocol::commands::GET;
use crate::protocol::framing::{decode_line, read_line_bounded};
use crate::protocol::{
    Command, CommandStatus, handle_cmd_get, handle_cmd_list, parse_command,
};
use crate::registry::ConnectedClient;
use crate::server::shutdown::SessionTicket;
use crate::server::state::ServerState;
use crate::session::SessionRole;

/// An accepted data connection.
///
/// Counted as a connected client and as an active session from creation
/// until the session ends.
pub struct DataSession {
    stream: TcpStream,
    peer: SocketAddr,
    state: ServerState,
    _client: ConnectedClient,
    _ticket: SessionTicket,
}

impl DataSession {
    pub fn new(stream: TcpStream, peer: SocketAddr, state: ServerState) -> Self {
        let client = state.counter.connect();
        let ticket = state.shutdown.track_session();
        Self {
            stream,
            peer,
            state,
            _client: client,
            _ticket: ticket,
        }
    }

    pub async fn run(self) {
        let peer = self.peer.to_string();
        info!("New client connected: {} ({} session)", peer, SessionRole::Data);

        let (read_half, write_half) = self.stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut writer = BufWriter::new(write_half);

        if let Err(e) = run_data_session(&mut reader, &mut writer, &peer, &self.state).await {
            handle_session_error(&peer, &e);
        }

        info!("Connection closed: {}", peer);
    }
}

/// The data session command loop over any split stream.
pub async fn run_data_session<R, W>(
    reader: &mut R,
    writer: &mut W,
    peer: &str,
    state: &ServerState,
) -> Result<(), ShareServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let idle_timeout = state.config.idle_timeout();
    let max_line_length = state.config.max_line_length;
    // Survives a timed-out read, which may leave a partial line in it
    let mut buf = Vec::new();

    loop {
        if state.shutdown.is_shutting_down() {
            debug!("Client handler shutting down: {}", peer);
            return Ok(());
        }

        let read = read_line_bounded(reader, &mut buf, max_line_length);
        match tokio::time::timeout(idle_timeout, read).await {
            Err(_) => continue,
            Ok(Ok(0)) => {
                info!("Connection closed by client {}", peer);
                return Ok(());
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e.into()),
        }

        let line = decode_line(&buf);
        buf.clear();
        if line.trim().is_empty() {
            continue;
        }

        let command = parse_command(&line);
        debug!("Received from {}: {:?}", peer, command);

        let status = match command {
            Command::List => handle_cmd_list(reader, writer, state).await?,
            Command::Get(filename) => handle_cmd_get(reader, writer, state, &filename).await?,
            Command::End => CommandStatus::CloseConnection,
            Command::MissingArgument(GET) => {
                warn!("Get command missing filename from {}", peer);
                CommandStatus::Continue
            }
            other if other.is_control_only() => {
                warn!("Control command on data port from {}: {:?}", peer, other);
                CommandStatus::Continue
            }
            other => {
                warn!("Unknown command from {}: {:?}", peer, other);
                CommandStatus::Continue
            }
        };

        if status == CommandStatus::CloseConnection {
            info!("Client {} requested to end the session", peer);
            return Ok(());
        }
    }
}
