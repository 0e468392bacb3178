//! Line framing
//!
//! Every protocol message is one UTF-8 line terminated by `\n`. Senders flush
//! after each line so replies are never held back behind a buffered writer.

use log::debug;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Writes `message` followed by a newline, then flushes.
pub async fn send_message<W>(writer: &mut W, message: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(message.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    debug!("Sending message: {}", message);
    Ok(())
}

/// Reads one line and returns it without its line terminator.
///
/// Returns `Ok(None)` when the peer closed the connection.
pub async fn receive_message<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    let line = decode_line(&buf);
    debug!("Received message: {}", line);
    Ok(Some(line))
}

/// Appends bytes up to and including the next `\n` to `buf`.
///
/// Fails with `InvalidData` once `buf` holds more than `max_len` bytes without
/// a line terminator. Cancel safe: bytes read before a cancellation stay in
/// `buf`, so the caller can resume with the same buffer.
pub async fn read_line_bounded<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    // One extra byte leaves room for the terminator itself
    let remaining = (max_len + 1).saturating_sub(buf.len()) as u64;
    let n = (&mut *reader).take(remaining).read_until(b'\n', buf).await?;

    if buf.len() > max_len && !buf.ends_with(b"\n") {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("line exceeds {} bytes", max_len),
        ));
    }
    Ok(n)
}

/// Strips the `\n` (and an optional `\r`) from a raw line.
pub fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, BufReader};

    #[tokio::test]
    async fn test_send_message_appends_newline() {
        let (mut client, mut server) = tokio::io::duplex(64);
        send_message(&mut server, "FileCnt 2").await.unwrap();
        drop(server);

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "FileCnt 2\n");
    }

    #[tokio::test]
    async fn test_receive_message_strips_terminators() {
        let data: &[u8] = b"List\r\nGet a.txt\nEnd";
        let mut reader = BufReader::new(data);

        assert_eq!(receive_message(&mut reader).await.unwrap(), Some("List".into()));
        assert_eq!(
            receive_message(&mut reader).await.unwrap(),
            Some("Get a.txt".into())
        );
        assert_eq!(receive_message(&mut reader).await.unwrap(), Some("End".into()));
        assert_eq!(receive_message(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_bounded_accepts_line_at_limit() {
        let data: &[u8] = b"Get a.txt\nEnd\n";
        let mut reader = BufReader::new(data);
        let mut buf = Vec::new();

        assert_eq!(read_line_bounded(&mut reader, &mut buf, 9).await.unwrap(), 10);
        assert_eq!(buf, b"Get a.txt\n");

        buf.clear();
        read_line_bounded(&mut reader, &mut buf, 9).await.unwrap();
        assert_eq!(buf, b"End\n");
    }

    #[tokio::test]
    async fn test_read_line_bounded_rejects_long_line() {
        let data = vec![b'x'; 4096];
        let mut reader = BufReader::new(data.as_slice());
        let mut buf = Vec::new();

        let err = read_line_bounded(&mut reader, &mut buf, 64).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert!(buf.len() <= 65);
    }

    #[tokio::test]
    async fn test_read_line_bounded_counts_resumed_bytes() {
        let data: &[u8] = b"defgh\n";
        let mut reader = BufReader::new(data);
        // Left over from an earlier, interrupted read
        let mut buf = b"abc".to_vec();

        let err = read_line_bounded(&mut reader, &mut buf, 6).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
