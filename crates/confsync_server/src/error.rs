//! Error types for the sync listener.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while handling an inbound connection.
///
/// All of these are handled at the connection boundary; none escape the
/// accept loop or affect other connections.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed or over-limit frame from the peer.
    #[error("protocol error: {0}")]
    Protocol(#[from] confsync_protocol::CodecError),

    /// The peer stopped sending before the frame was complete.
    #[error("incomplete frame: {0}")]
    IncompleteFrame(String),

    /// A read or write exceeded its timeout.
    #[error("connection timed out")]
    Timeout,

    /// I/O error on the socket.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was abandoned because shutdown was requested.
    #[error("connection cancelled by shutdown")]
    Cancelled,
}

impl ServerError {
    /// Returns true if the peer violated the protocol (as opposed to a
    /// transport-level failure on an otherwise well-formed exchange).
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            ServerError::Protocol(_) | ServerError::IncompleteFrame(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsync_protocol::CodecError;

    #[test]
    fn protocol_classification() {
        let err = ServerError::Protocol(CodecError::InvalidHeader("abc".into()));
        assert!(err.is_protocol_violation());
        assert!(!ServerError::Timeout.is_protocol_violation());
        assert!(!ServerError::Cancelled.is_protocol_violation());
    }

    #[test]
    fn codec_error_converts() {
        let err: ServerError = CodecError::BodyTooLarge {
            len: 2_000_000,
            max: 1_048_576,
        }
        .into();
        assert!(err.to_string().contains("2000000"));
    }
}
