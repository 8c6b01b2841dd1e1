//! The outbound sync client.

use crate::config::ClientConfig;
use crate::error::{SyncError, SyncResult};
use confsync_protocol::encode_frame;
use confsync_store::ConfigStore;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of a successful push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// Total frame bytes written to the peer.
    pub bytes_sent: usize,
    /// Number of configuration entries in the pushed snapshot.
    pub entries: usize,
}

/// Pushes the shared configuration to a peer over TCP.
///
/// The client reads the store, encodes one frame, connects with a bounded
/// timeout and writes the frame, looping over partial writes until every
/// byte is on the wire. All failures are reported to the caller; none are
/// fatal to the process.
pub struct SyncClient {
    store: Arc<ConfigStore>,
    config: ClientConfig,
    token: CancellationToken,
}

impl SyncClient {
    /// Creates a new sync client.
    pub fn new(store: Arc<ConfigStore>, config: ClientConfig, token: CancellationToken) -> Self {
        Self {
            store,
            config,
            token,
        }
    }

    /// Pushes the current configuration snapshot to `host:port`.
    ///
    /// The port is validated before any connection attempt; an invalid port
    /// aborts with [`SyncError::Configuration`]. The connect is bounded by
    /// the configured timeout and raced against the cancellation token.
    pub async fn push_current_config(&self, host: &str, port: &str) -> SyncResult<PushOutcome> {
        let port = parse_port(port)?;
        if host.trim().is_empty() {
            return Err(SyncError::Configuration("empty peer host".into()));
        }
        let peer = format!("{}:{}", host.trim(), port);

        if self.token.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        debug!(%peer, "connecting to peer");
        let mut stream = tokio::select! {
            _ = self.token.cancelled() => return Err(SyncError::Cancelled),
            connected = timeout(self.config.connect_timeout, TcpStream::connect(&peer)) => {
                match connected {
                    Ok(Ok(stream)) => stream,
                    Ok(Err(source)) => {
                        warn!(%peer, error = %source, "connection failed");
                        return Err(SyncError::Connect { peer, source });
                    }
                    Err(_) => {
                        warn!(%peer, "connection timed out");
                        return Err(SyncError::Timeout);
                    }
                }
            }
        };

        let snapshot = self.store.snapshot();
        let frame = encode_frame(&snapshot);

        let bytes_sent = self.send_frame(&mut stream, &frame).await?;

        // Half-close so the peer sees EOF once the frame is complete.
        stream.shutdown().await?;

        info!(%peer, bytes_sent, entries = snapshot.len(), "configuration pushed");
        Ok(PushOutcome {
            bytes_sent,
            entries: snapshot.len(),
        })
    }

    /// Writes the full frame, advancing an offset across partial writes.
    ///
    /// Each write is bounded by the write timeout and raced against the
    /// cancellation token; a zero-byte write means the peer closed early.
    async fn send_frame(&self, stream: &mut TcpStream, frame: &[u8]) -> SyncResult<usize> {
        let mut sent = 0;
        while sent < frame.len() {
            let written = tokio::select! {
                _ = self.token.cancelled() => return Err(SyncError::Cancelled),
                wrote = timeout(self.config.write_timeout, stream.write(&frame[sent..])) => {
                    match wrote {
                        Ok(Ok(n)) => n,
                        Ok(Err(e)) => return Err(SyncError::Io(e)),
                        Err(_) => return Err(SyncError::Timeout),
                    }
                }
            };

            if written == 0 {
                return Err(SyncError::Io(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "peer closed connection mid-frame",
                )));
            }
            sent += written;
        }
        Ok(sent)
    }
}

/// Validates a port string as an integer in 1..=65535.
fn parse_port(port: &str) -> SyncResult<u16> {
    match port.trim().parse::<u32>() {
        Ok(p) if (1..=65_535).contains(&p) => Ok(p as u16),
        _ => Err(SyncError::Configuration(format!("invalid port: {port:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsync_store::ConfigEntry;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn make_client(store: Arc<ConfigStore>) -> SyncClient {
        SyncClient::new(store, ClientConfig::new(), CancellationToken::new())
    }

    #[test]
    fn port_validation() {
        assert_eq!(parse_port("9000").unwrap(), 9000);
        assert_eq!(parse_port(" 1 ").unwrap(), 1);
        assert_eq!(parse_port("65535").unwrap(), 65_535);

        assert!(parse_port("0").is_err());
        assert!(parse_port("65536").is_err());
        assert!(parse_port("not-a-port").is_err());
        assert!(parse_port("").is_err());
    }

    #[tokio::test]
    async fn invalid_port_aborts_without_connecting() {
        let client = make_client(Arc::new(ConfigStore::new()));
        let result = client.push_current_config("127.0.0.1", "70000").await;
        assert!(matches!(result, Err(SyncError::Configuration(_))));
    }

    #[tokio::test]
    async fn empty_host_is_a_configuration_error() {
        let client = make_client(Arc::new(ConfigStore::new()));
        let result = client.push_current_config("", "9000").await;
        assert!(matches!(result, Err(SyncError::Configuration(_))));
    }

    #[tokio::test]
    async fn connection_refused_is_retryable() {
        let store = Arc::new(ConfigStore::new());
        store.set("NETWORK", "PORT", "9000");
        let client = make_client(store);

        // Bind a listener to find a free port, then drop it.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = client
            .push_current_config("127.0.0.1", &port.to_string())
            .await;
        match result {
            Err(e) => assert!(e.is_retryable(), "expected retryable error, got {e}"),
            Ok(_) => panic!("push to closed port should fail"),
        }
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_connect() {
        let token = CancellationToken::new();
        token.cancel();
        let client = SyncClient::new(
            Arc::new(ConfigStore::new()),
            ClientConfig::new(),
            token,
        );

        let result = client.push_current_config("127.0.0.1", "9000").await;
        assert!(matches!(result, Err(SyncError::Cancelled)));
    }

    #[tokio::test]
    async fn push_delivers_full_frame() {
        let store = Arc::new(ConfigStore::new());
        store.set("NETWORK", "PORT", "9000");
        store.set("NETWORK", "CLIENT_HOST", "192.168.4.10");
        let client = make_client(Arc::clone(&store));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let receiver = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let outcome = client
            .push_current_config("127.0.0.1", &port.to_string())
            .await
            .unwrap();
        assert_eq!(outcome.entries, 2);

        let received = receiver.await.unwrap();
        assert_eq!(received.len(), outcome.bytes_sent);

        // Frame decodes back to the snapshot.
        let newline = received.iter().position(|&b| b == b'\n').unwrap();
        let header = std::str::from_utf8(&received[..newline]).unwrap();
        let body = &received[newline + 1..];
        assert_eq!(
            confsync_protocol::parse_header(header).unwrap() as usize,
            body.len()
        );
        let decoded = confsync_protocol::decode_body(body);
        assert_eq!(
            decoded,
            vec![
                ConfigEntry::new("NETWORK", "CLIENT_HOST", "192.168.4.10"),
                ConfigEntry::new("NETWORK", "PORT", "9000"),
            ]
        );
    }
}
