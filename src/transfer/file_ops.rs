//! Module `file_ops`
//!
//! Moves a file body across the connection. The body is raw bytes whose
//! length was announced beforehand with `Start <size>`, so both directions
//! copy exactly `size` bytes and treat an early end of input as an error.

use log::{debug, info};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Streams exactly `size` bytes from `source` into `sink`, then flushes.
pub async fn copy_exact<R, W>(
    source: &mut R,
    sink: &mut W,
    size: u64,
    buffer_size: usize,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut remaining = size;

    while remaining > 0 {
        let want = remaining.min(buffer.len() as u64) as usize;
        let n = source.read(&mut buffer[..want]).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("body ended after {} of {} bytes", size - remaining, size),
            ));
        }
        sink.write_all(&buffer[..n]).await?;
        remaining -= n as u64;
    }

    sink.flush().await?;
    Ok(size)
}

/// Sends a file body to the client.
pub async fn handle_file_download<R, W>(
    file: &mut R,
    writer: &mut W,
    filename: &str,
    size: u64,
    buffer_size: usize,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    debug!("Sending file {} ({} bytes)", filename, size);
    let sent = copy_exact(file, writer, size, buffer_size).await?;
    info!("File {} sent ({} bytes)", filename, sent);
    Ok(sent)
}

/// Receives a file body announced with `size` bytes into `out`.
pub async fn receive_file<R, W>(
    reader: &mut R,
    out: &mut W,
    size: u64,
    buffer_size: usize,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    copy_exact(reader, out, size, buffer_size).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_exact_stops_at_size() {
        let mut source: &[u8] = b"0123456789trailing";
        let mut sink = Vec::new();
        let copied = copy_exact(&mut source, &mut sink, 10, 3).await.unwrap();
        assert_eq!(copied, 10);
        assert_eq!(sink, b"0123456789");
        assert_eq!(source, b"trailing");
    }

    #[tokio::test]
    async fn test_copy_exact_short_source() {
        let mut source: &[u8] = b"abc";
        let mut sink = Vec::new();
        let err = copy_exact(&mut source, &mut sink, 5, 4096).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_copy_exact_empty_body() {
        let mut source: &[u8] = b"";
        let mut sink = Vec::new();
        assert_eq!(copy_exact(&mut source, &mut sink, 0, 16).await.unwrap(), 0);
        assert!(sink.is_empty());
    }
}
