//! Module `client`
//!
//! Client side of the sharing protocol: one connection to either port,
//! with one method per command. Every reply is read in full before a method
//! returns, so the connection is always ready for the next command.

use log::debug;
use std::io;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::ShareServerError;
use crate::protocol::commands::{END, GET, HIDE, LIST, REVEAL, TERMINATE};
use crate::protocol::framing::{receive_message, send_message};
use crate::protocol::responses;
use crate::storage::FileEntry;
use crate::transfer::receive_file;

const BUFFER_SIZE: usize = 4096;

pub struct ShareClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl ShareClient {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ShareServerError> {
        let stream = TcpStream::connect(addr).await?;
        debug!("Connected to {}", stream.peer_addr()?);
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// `List`: the visible files, in the order the server sent them.
    pub async fn list(&mut self) -> Result<Vec<FileEntry>, ShareServerError> {
        send_message(&mut self.writer, LIST).await?;

        let header = self.expect_line().await?;
        let count = responses::parse_file_count(&header)
            .ok_or_else(|| ShareServerError::ProtocolError(format!("invalid file count: {}", header)))?;

        let mut files = Vec::with_capacity(count);
        for _ in 0..count {
            let line = self.expect_line().await?;
            let (name, size) = responses::parse_file_entry(&line).ok_or_else(|| {
                ShareServerError::ProtocolError(format!("invalid file entry: {}", line))
            })?;
            files.push(FileEntry { name, size });
        }

        send_message(&mut self.writer, responses::OK).await?;
        Ok(files)
    }

    /// `Get`: the file body, or `None` when the server answered `FileUnknown`.
    pub async fn get(&mut self, filename: &str) -> Result<Option<Vec<u8>>, ShareServerError> {
        let mut body = Vec::new();
        Ok(self.get_into(filename, &mut body).await?.map(|_| body))
    }

    /// `Get` into a local file. Nothing is left behind when the file is unknown.
    pub async fn get_to_file(
        &mut self,
        filename: &str,
        destination: &Path,
    ) -> Result<Option<u64>, ShareServerError> {
        let mut file = tokio::fs::File::create(destination).await?;
        let received = self.get_into(filename, &mut file).await;
        drop(file);

        if !matches!(received, Ok(Some(_))) {
            let _ = tokio::fs::remove_file(destination).await;
        }
        received
    }

    /// `Get` streaming the body into `out`; returns the byte count.
    pub async fn get_into<W>(
        &mut self,
        filename: &str,
        out: &mut W,
    ) -> Result<Option<u64>, ShareServerError>
    where
        W: AsyncWrite + Unpin,
    {
        send_message(&mut self.writer, &format!("{} {}", GET, filename)).await?;

        let reply = self.expect_line().await?;
        if reply == responses::FILE_UNKNOWN {
            return Ok(None);
        }
        let size = responses::parse_start(&reply).ok_or_else(|| {
            ShareServerError::ProtocolError(format!("unexpected reply to Get: {}", reply))
        })?;

        let received = receive_file(&mut self.reader, out, size, BUFFER_SIZE).await?;
        send_message(&mut self.writer, responses::OK).await?;
        Ok(Some(received))
    }

    /// `Hide` (control port): `true` on `OK`, `false` on `FileUnknown`.
    pub async fn hide(&mut self, filename: &str) -> Result<bool, ShareServerError> {
        send_message(&mut self.writer, &format!("{} {}", HIDE, filename)).await?;
        self.expect_ok_or_unknown().await
    }

    /// `Reveal` (control port): `true` on `OK`, `false` on `FileUnknown`.
    pub async fn reveal(&mut self, filename: &str) -> Result<bool, ShareServerError> {
        send_message(&mut self.writer, &format!("{} {}", REVEAL, filename)).await?;
        self.expect_ok_or_unknown().await
    }

    /// `Terminate` (control port): returns once the server acknowledged.
    pub async fn terminate(mut self) -> Result<(), ShareServerError> {
        send_message(&mut self.writer, TERMINATE).await?;
        match self.expect_line().await?.as_str() {
            responses::OK => Ok(()),
            other => Err(ShareServerError::ProtocolError(format!(
                "unexpected reply to Terminate: {}",
                other
            ))),
        }
    }

    /// `End`, then closes the connection.
    pub async fn end(mut self) -> Result<(), ShareServerError> {
        send_message(&mut self.writer, END).await?;
        self.writer.shutdown().await?;
        Ok(())
    }

    /// Sends a raw line without waiting for any reply.
    pub async fn send_line(&mut self, line: &str) -> Result<(), ShareServerError> {
        send_message(&mut self.writer, line).await?;
        Ok(())
    }

    /// Reads the next raw line; `None` once the server closed the connection.
    pub async fn read_line(&mut self) -> Result<Option<String>, ShareServerError> {
        Ok(receive_message(&mut self.reader).await?)
    }

    async fn expect_line(&mut self) -> Result<String, ShareServerError> {
        match receive_message(&mut self.reader).await? {
            Some(line) => Ok(line),
            None => Err(ShareServerError::IoError(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ))),
        }
    }

    async fn expect_ok_or_unknown(&mut self) -> Result<bool, ShareServerError> {
        match self.expect_line().await?.as_str() {
            responses::OK => Ok(true),
            responses::FILE_UNKNOWN => Ok(false),
            other => Err(ShareServerError::ProtocolError(format!(
                "unexpected reply: {}",
                other
            ))),
        }
    }
}
