//! Wire framing for commands, payloads and replies.
//!
//! A command is one ASCII line. A payload that follows it is framed either
//! with a declared length (`LEN <n>` header, the canonical mode) or with a
//! trailing sentinel marker (`RAW` header, legacy mode used only when the
//! sender cannot know the length up front). Replies are a status line
//! (`OK:` / `ERROR:`) or a length-framed body (`DATA` / `LIST`).

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::types::{Command, ProtocolError, Reply};

/// Sentinel terminating a marker-delimited payload.
pub const TRANSFER_MARKER: &[u8] = b"\r\n--END-OF-TRANSFER--\r\n";

/// Reads one protocol line, without the trailing newline.
/// Returns `None` on clean end-of-stream.
pub async fn read_line<R>(reader: &mut R) -> Result<Option<String>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Reads and parses the next command line.
/// Returns `None` when the peer closed the connection between commands.
pub async fn read_command<R>(reader: &mut R) -> Result<Option<Command>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    match read_line(reader).await? {
        Some(line) => Command::parse(&line).map(Some),
        None => Ok(None),
    }
}

pub async fn write_command<W>(writer: &mut W, command: &Command) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(format!("{}\n", command.encode()).as_bytes())
        .await?;
    writer.flush().await?;
    Ok(())
}

/// Sends a payload with declared-length framing.
pub async fn write_payload<W>(writer: &mut W, data: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(format!("LEN {}\n", data.len()).as_bytes())
        .await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Sends a payload in the legacy marker-delimited mode.
///
/// Only valid when `data` does not itself contain [`TRANSFER_MARKER`]; the
/// declared-length mode has no such restriction and is always preferred.
pub async fn write_payload_marker<W>(writer: &mut W, data: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(b"RAW\n").await?;
    writer.write_all(data).await?;
    writer.write_all(TRANSFER_MARKER).await?;
    writer.flush().await?;
    Ok(())
}

/// Receives one payload, honoring whichever framing the sender chose.
pub async fn read_payload<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let header = read_line(reader)
        .await?
        .ok_or(ProtocolError::IncompleteTransfer)?;
    let mut parts = header.split_whitespace();
    match parts.next() {
        Some("LEN") => {
            let len: usize = parts
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| ProtocolError::BadFrameHeader(header.clone()))?;
            read_declared(reader, len).await
        }
        Some("RAW") => read_until_marker(reader).await,
        _ => Err(ProtocolError::BadFrameHeader(header)),
    }
}

/// Reads exactly `len` bytes, looping across short reads. A connection that
/// closes early is an incomplete transfer, never a shorter payload.
async fn read_declared<R>(reader: &mut R, len: usize) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut data = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let n = reader.read(&mut data[filled..]).await?;
        if n == 0 {
            return Err(ProtocolError::IncompleteTransfer);
        }
        filled += n;
    }
    Ok(data)
}

/// Reads until the transfer marker appears.
///
/// The scan window always starts `marker_len - 1` bytes before the newest
/// chunk so a marker split across two reads is still found; scanning only
/// the just-received chunk would miss it. Only the bytes up to and including
/// the marker are consumed from the reader, so anything the peer sent after
/// the frame stays buffered for the next read.
async fn read_until_marker<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut data = Vec::new();
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Err(ProtocolError::IncompleteTransfer);
        }
        let n = chunk.len();
        let scan_from = data.len().saturating_sub(TRANSFER_MARKER.len() - 1);
        data.extend_from_slice(chunk);
        if let Some(pos) = find_marker(&data[scan_from..]) {
            let end = scan_from + pos;
            let excess = data.len() - (end + TRANSFER_MARKER.len());
            reader.consume(n - excess);
            data.truncate(end);
            return Ok(data);
        }
        reader.consume(n);
    }
}

fn find_marker(haystack: &[u8]) -> Option<usize> {
    if haystack.len() < TRANSFER_MARKER.len() {
        return None;
    }
    haystack
        .windows(TRANSFER_MARKER.len())
        .position(|window| window == TRANSFER_MARKER)
}

pub async fn write_reply<W>(writer: &mut W, reply: &Reply) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    match reply {
        Reply::Ok(message) => {
            writer
                .write_all(format!("OK: {}\n", message).as_bytes())
                .await?;
        }
        Reply::Error(message) => {
            writer
                .write_all(format!("ERROR: {}\n", message).as_bytes())
                .await?;
        }
        Reply::Data { name, bytes } => {
            writer
                .write_all(format!("DATA {} {}\n", name, bytes.len()).as_bytes())
                .await?;
            writer.write_all(bytes).await?;
        }
        Reply::Listing(files) => {
            let mut body = files.join("\n");
            if !body.is_empty() {
                body.push('\n');
            }
            writer
                .write_all(format!("LIST {}\n", body.len()).as_bytes())
                .await?;
            writer.write_all(body.as_bytes()).await?;
        }
    }
    writer.flush().await?;
    Ok(())
}

/// Reads one reply. `ERROR:` status lines come back as `Reply::Error` so a
/// forwarding node can relay them verbatim.
pub async fn read_reply<R>(reader: &mut R) -> Result<Reply, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_line(reader)
        .await?
        .ok_or(ProtocolError::IncompleteTransfer)?;

    if let Some(message) = line.strip_prefix("OK:") {
        return Ok(Reply::Ok(message.trim().to_string()));
    }
    if let Some(message) = line.strip_prefix("ERROR:") {
        return Ok(Reply::Error(message.trim().to_string()));
    }

    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("DATA") => {
            let name = parts
                .next()
                .ok_or_else(|| ProtocolError::BadFrameHeader(line.clone()))?
                .to_string();
            let len: usize = parts
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| ProtocolError::BadFrameHeader(line.clone()))?;
            let bytes = read_declared(reader, len).await?;
            Ok(Reply::Data { name, bytes })
        }
        Some("LIST") => {
            let len: usize = parts
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| ProtocolError::BadFrameHeader(line.clone()))?;
            let body = read_declared(reader, len).await?;
            let body = String::from_utf8_lossy(&body);
            Ok(Reply::Listing(
                body.lines()
                    .filter(|l| !l.is_empty())
                    .map(|l| l.to_string())
                    .collect(),
            ))
        }
        _ => Err(ProtocolError::BadFrameHeader(line)),
    }
}
