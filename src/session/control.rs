//! Control session
//!
//! Serves the administrative client: List, Hide, Reveal, Terminate and End.
//! Unlike a data session it waits for the next command without a timeout.
//! That wait is abandoned when shutdown is signalled, so an idle
//! administrator never keeps the control listener alive; a command already
//! being handled always runs to its reply.

use log::{debug, info, warn};
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, BufWriter};
use tokio::net::TcpStream;

use crate::error::ShareServerError;
use crate::error::handlers::handle_session_error;
use crate::protocol::framing::{decode_line, read_line_bounded};
use crate::protocol::{
    Command, CommandStatus, handle_cmd_hide, handle_cmd_list, handle_cmd_reveal,
    handle_cmd_terminate, parse_command,
};
use crate::server::state::ServerState;
use crate::session::SessionRole;

/// An accepted control connection.
pub struct ControlSession {
    stream: TcpStream,
    peer: SocketAddr,
    state: ServerState,
}

impl ControlSession {
    pub fn new(stream: TcpStream, peer: SocketAddr, state: ServerState) -> Self {
        Self {
            stream,
            peer,
            state,
        }
    }

    pub async fn run(self) {
        let peer = self.peer.to_string();
        info!("Control client connected: {} ({} session)", peer, SessionRole::Control);

        let (read_half, write_half) = self.stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut writer = BufWriter::new(write_half);

        if let Err(e) = run_control_session(&mut reader, &mut writer, &peer, &self.state).await {
            handle_session_error(&peer, &e);
        }

        info!("Control connection closed: {}", peer);
    }
}

/// The control session command loop over any split stream.
pub async fn run_control_session<R, W>(
    reader: &mut R,
    writer: &mut W,
    peer: &str,
    state: &ServerState,
) -> Result<(), ShareServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let max_line_length = state.config.max_line_length;
    let mut buf = Vec::new();

    loop {
        let read = tokio::select! {
            biased;
            _ = state.shutdown.cancelled() => {
                info!("Control client {} released on shutdown", peer);
                return Ok(());
            }
            read = read_line_bounded(reader, &mut buf, max_line_length) => read?,
        };
        if read == 0 {
            info!("Control connection closed by client {}", peer);
            return Ok(());
        }

        let line = decode_line(&buf);
        buf.clear();
        if line.trim().is_empty() {
            continue;
        }

        let command = parse_command(&line);
        debug!("Received control command from {}: {:?}", peer, command);

        let status = match command {
            Command::List => handle_cmd_list(reader, writer, state).await?,
            Command::Hide(filename) => handle_cmd_hide(writer, state, &filename).await?,
            Command::Reveal(filename) => handle_cmd_reveal(writer, state, &filename).await?,
            Command::Terminate => handle_cmd_terminate(writer, state).await?,
            Command::End => CommandStatus::CloseConnection,
            Command::MissingArgument(name) => {
                warn!("{} command missing filename", name);
                CommandStatus::Continue
            }
            other => {
                warn!("Unknown control command from {}: {:?}", peer, other);
                CommandStatus::Continue
            }
        };

        if status == CommandStatus::CloseConnection {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::registry::{ClientCounter, HiddenRegistry};
    use crate::server::shutdown::ShutdownCoordinator;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn test_state(root: &std::path::Path) -> ServerState {
        let (hidden, _) = HiddenRegistry::spawn(8);
        let (counter, _) = ClientCounter::spawn();
        ServerState {
            config: Arc::new(ServerConfig::ephemeral(root)),
            hidden,
            counter,
            shutdown: ShutdownCoordinator::new(Duration::from_millis(1)),
        }
    }

    async fn run_script(state: &ServerState, script: &[u8]) -> String {
        let mut reader = BufReader::new(script);
        let mut out = Vec::new();
        run_control_session(&mut reader, &mut out, "test", state)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_hide_list_reveal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"0123456789").unwrap();
        let state = test_state(dir.path());

        let out = run_script(
            &state,
            b"Hide a.txt\nList\nOK\nReveal a.txt\nReveal a.txt\nEnd\n",
        )
        .await;
        assert_eq!(out, "OK\nFileCnt 1\nb.txt 10\nOK\nOK\n");
        assert!(!state.hidden.is_hidden("a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_ignores_malformed_and_data_commands() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let state = test_state(dir.path());

        let out = run_script(&state, b"Hide\nReveal\nGet a.txt\nWhat\n\nHide ghost\nEnd\n").await;
        assert_eq!(out, "FileUnknown\n");
    }

    #[tokio::test]
    async fn test_terminate_ends_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        // Lines after Terminate are never read
        let out = run_script(&state, b"Terminate\nList\n").await;
        assert_eq!(out, "OK\n");
        assert!(state.shutdown.is_shutting_down());
    }

    #[tokio::test]
    async fn test_idle_session_released_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let shutdown = state.shutdown.clone();
        let (mut client, server) = tokio::io::duplex(1024);

        let task = tokio::spawn(async move {
            let (read_half, mut write_half) = tokio::io::split(server);
            let mut reader = BufReader::new(read_half);
            run_control_session(&mut reader, &mut write_half, "test", &state).await
        });

        client.write_all(b"Reveal a.txt\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());

        shutdown.signal();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("idle control session should end on shutdown")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_overlong_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::ephemeral(dir.path());
        config.max_line_length = 8;
        let mut state = test_state(dir.path());
        state.config = Arc::new(config);

        let mut reader = BufReader::new(&b"Hide a-rather-long-name.txt\n"[..]);
        let mut out = Vec::new();
        let result = run_control_session(&mut reader, &mut out, "test", &state).await;
        assert!(matches!(result, Err(ShareServerError::IoError(_))));
        assert!(out.is_empty());
    }
}
