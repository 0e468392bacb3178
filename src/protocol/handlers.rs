//! Command handlers for the file-sharing protocol.
//!
//! Each handler services one command on an already-split connection: it
//! reads and writes the stream and talks to the hidden registry or the
//! shutdown coordinator. Missing files are answered on the wire; an `Err`
//! means the connection itself is unusable and the session should close.

use log::{debug, info, warn};
use std::io;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::error::handlers::storage_error_response;
use crate::error::{ShareServerError, StorageError};
use crate::protocol::framing::{receive_message, send_message};
use crate::protocol::{CommandStatus, responses};
use crate::server::shutdown::DrainOutcome;
use crate::server::state::ServerState;
use crate::storage::{self, validate_filename};
use crate::transfer::handle_file_download;

/// Handles `List`: sends the visible files, then waits for the client's `OK`.
pub async fn handle_cmd_list<R, W>(
    reader: &mut R,
    writer: &mut W,
    state: &ServerState,
) -> Result<CommandStatus, ShareServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    // The listing reflects the registry as of this request
    let hidden = state.hidden.snapshot().await?;
    let files = storage::list_files(&state.server_root(), &hidden).await?;

    send_message(writer, &responses::format_file_count(files.len())).await?;
    for file in &files {
        send_message(writer, &responses::format_file_entry(&file.name, file.size)).await?;
    }

    if await_acknowledgment(reader).await? {
        debug!("Client confirmed reception of list");
    } else {
        warn!("Client did not acknowledge the file list");
    }
    Ok(CommandStatus::Continue)
}

/// Handles `Get <filename>`: `Start <size>`, the raw bytes, then the client's `OK`.
pub async fn handle_cmd_get<R, W>(
    reader: &mut R,
    writer: &mut W,
    state: &ServerState,
    filename: &str,
) -> Result<CommandStatus, ShareServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let opened = match validate_filename(filename) {
        Err(e) => Err(e),
        Ok(name) => {
            if state.hidden.is_hidden(name).await? {
                Err(StorageError::Hidden(name.to_string()))
            } else {
                storage::open_for_retrieval(&state.server_root(), name).await
            }
        }
    };

    let (mut file, size) = match opened {
        Ok(opened) => opened,
        Err(e) => {
            send_message(writer, storage_error_response("Get", &e)).await?;
            return Ok(CommandStatus::Continue);
        }
    };

    send_message(writer, &responses::format_start(size)).await?;
    handle_file_download(&mut file, writer, filename, size, state.config.buffer_size).await?;

    if await_acknowledgment(reader).await? {
        info!("File transferred successfully: {} ({} bytes)", filename, size);
    } else {
        warn!("Client did not send OK after file transfer: {}", filename);
    }
    Ok(CommandStatus::Continue)
}

/// Handles `Hide <filename>`; only existing regular files can be hidden.
pub async fn handle_cmd_hide<W>(
    writer: &mut W,
    state: &ServerState,
    filename: &str,
) -> Result<CommandStatus, ShareServerError>
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = storage::check_shared_file(&state.server_root(), filename).await {
        send_message(writer, storage_error_response("Hide", &e)).await?;
        return Ok(CommandStatus::Continue);
    }

    state.hidden.hide(filename).await?;
    send_message(writer, responses::OK).await?;
    Ok(CommandStatus::Continue)
}

/// Handles `Reveal <filename>`; replies `OK` whether or not it was hidden.
pub async fn handle_cmd_reveal<W>(
    writer: &mut W,
    state: &ServerState,
    filename: &str,
) -> Result<CommandStatus, ShareServerError>
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = storage::check_shared_file(&state.server_root(), filename).await {
        send_message(writer, storage_error_response("Reveal", &e)).await?;
        return Ok(CommandStatus::Continue);
    }

    if !state.hidden.reveal(filename).await? {
        debug!("File was not hidden: {}", filename);
    }
    send_message(writer, responses::OK).await?;
    Ok(CommandStatus::Continue)
}

/// Handles `Terminate`: drains the data sessions, then acknowledges.
///
/// The reply is sent even when the drain timed out.
pub async fn handle_cmd_terminate<W>(
    writer: &mut W,
    state: &ServerState,
) -> Result<CommandStatus, ShareServerError>
where
    W: AsyncWrite + Unpin,
{
    info!("Terminate command received - initiating server shutdown");

    let outcome = state.shutdown.drain(state.config.drain_timeout()).await;
    if outcome == DrainOutcome::TimedOut {
        warn!("Forcing shutdown with clients still connected");
    }

    send_message(writer, responses::OK).await?;
    info!("Server shutdown complete");
    Ok(CommandStatus::CloseConnection)
}

/// Reads the client's acknowledgment line. `Ok(false)` when it was not `OK`.
async fn await_acknowledgment<R>(reader: &mut R) -> Result<bool, ShareServerError>
where
    R: AsyncBufRead + Unpin,
{
    match receive_message(reader).await? {
        Some(line) if line.trim() == responses::OK => Ok(true),
        Some(line) => {
            warn!("Expected OK, received: {}", line);
            Ok(false)
        }
        None => Err(ShareServerError::IoError(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before acknowledgment",
        ))),
    }
}
