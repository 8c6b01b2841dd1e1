//! Per-connection protocol state machine.
//!
//! Each accepted connection runs `ReadHeader → ReadBody → Dispatch`, or
//! `ReadHeader → Reply` for a pull request, and is closed on every exit
//! path. The handler is generic over the stream so tests can drive it with
//! an in-memory duplex pipe.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use confsync_protocol::{decode_body, encode_frame, parse_header, CodecError, MAX_HEADER_LEN};
use confsync_store::ConfigStore;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::info;

const READ_CHUNK: usize = 4096;

/// How a connection was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// A push was received and applied; carries the changed-entry count.
    Pushed {
        /// Number of entries whose value actually changed.
        changed: usize,
    },
    /// A pull request was answered with the current configuration.
    Replied {
        /// Total reply frame bytes written.
        bytes_sent: usize,
    },
    /// The peer connected and closed without sending a header.
    ClosedEarly,
}

/// Runs the protocol state machine over one connection.
pub(crate) async fn handle_connection<S>(
    stream: &mut S,
    store: &ConfigStore,
    config: &ServerConfig,
    token: &CancellationToken,
) -> ServerResult<ConnectionOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let header = match read_header(stream, config, token).await? {
        Some(header) => header,
        None => return Ok(ConnectionOutcome::ClosedEarly),
    };

    // Rejects non-numeric headers and oversized declarations before any
    // body byte is read.
    let length = parse_header(&header)?;

    if length == 0 {
        // Pull request: reply with the full current configuration on the
        // same connection. The store is read, never mutated.
        let frame = encode_frame(&store.snapshot());
        let bytes_sent = write_frame(stream, &frame, config, token).await?;
        stream.shutdown().await?;
        info!(bytes_sent, "replied to pull request");
        return Ok(ConnectionOutcome::Replied { bytes_sent });
    }

    let body = read_body(stream, length as usize, config).await?;

    // Updates are applied only once the entire body has arrived; an aborted
    // transfer leaves the store untouched.
    let entries = decode_body(&body);
    let changes = store.apply_with_changes(&entries);

    for change in &changes {
        match &change.old_value {
            Some(old) => info!(
                section = %change.section,
                key = %change.key,
                old = %old,
                new = %change.new_value,
                "configuration updated"
            ),
            None => info!(
                section = %change.section,
                key = %change.key,
                new = %change.new_value,
                "configuration added"
            ),
        }
    }
    if changes.is_empty() {
        info!("push applied, no changes");
    } else {
        info!(changed = changes.len(), "push applied");
    }

    Ok(ConnectionOutcome::Pushed {
        changed: changes.len(),
    })
}

/// Reads header bytes until the newline terminator.
///
/// Returns `None` if the peer closed before sending anything. Header reads
/// are raced against the cancellation token; a connection still waiting for
/// its header is abandoned on shutdown.
async fn read_header<S>(
    stream: &mut S,
    config: &ServerConfig,
    token: &CancellationToken,
) -> ServerResult<Option<String>>
where
    S: AsyncRead + Unpin,
{
    let mut header = String::new();
    let mut byte = [0u8; 1];

    loop {
        let n = tokio::select! {
            _ = token.cancelled() => return Err(ServerError::Cancelled),
            read = timeout(config.idle_read_timeout, stream.read(&mut byte)) => {
                match read {
                    Ok(Ok(n)) => n,
                    Ok(Err(e)) => return Err(ServerError::Io(e)),
                    Err(_) => return Err(ServerError::Timeout),
                }
            }
        };

        if n == 0 {
            if header.is_empty() {
                return Ok(None);
            }
            return Err(ServerError::IncompleteFrame(
                "connection closed before header terminator".into(),
            ));
        }

        if byte[0] == b'\n' {
            return Ok(Some(header));
        }

        header.push(byte[0] as char);
        if header.len() > MAX_HEADER_LEN {
            return Err(ServerError::Protocol(CodecError::HeaderTooLong {
                len: header.len(),
                max: MAX_HEADER_LEN,
            }));
        }
    }
}

/// Reads exactly `expected` body bytes, tolerating arbitrary fragmentation.
///
/// Body reads are bounded by the idle timeout only; an accepted transfer in
/// progress is not aborted by shutdown and instead completes or times out.
async fn read_body<S>(
    stream: &mut S,
    expected: usize,
    config: &ServerConfig,
) -> ServerResult<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut body = Vec::with_capacity(expected);
    let mut chunk = vec![0u8; READ_CHUNK.min(expected)];

    while body.len() < expected {
        let want = (expected - body.len()).min(chunk.len());
        let n = match timeout(config.idle_read_timeout, stream.read(&mut chunk[..want])).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(ServerError::Io(e)),
            Err(_) => return Err(ServerError::Timeout),
        };

        if n == 0 {
            return Err(ServerError::IncompleteFrame(format!(
                "peer closed after {} of {} body bytes",
                body.len(),
                expected
            )));
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(body)
}

/// Writes the full frame, advancing an offset across partial writes.
async fn write_frame<S>(
    stream: &mut S,
    frame: &[u8],
    config: &ServerConfig,
    token: &CancellationToken,
) -> ServerResult<usize>
where
    S: AsyncWrite + Unpin,
{
    let mut sent = 0;
    while sent < frame.len() {
        let written = tokio::select! {
            _ = token.cancelled() => return Err(ServerError::Cancelled),
            wrote = timeout(config.write_timeout, stream.write(&frame[sent..])) => {
                match wrote {
                    Ok(Ok(n)) => n,
                    Ok(Err(e)) => return Err(ServerError::Io(e)),
                    Err(_) => return Err(ServerError::Timeout),
                }
            }
        };

        if written == 0 {
            return Err(ServerError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "peer closed connection mid-reply",
            )));
        }
        sent += written;
    }
    Ok(sent)
}
