//! Error types for the sync client.

use thiserror::Error;

/// Result type for client operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while pushing configuration to a peer.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Invalid peer address or port; no connection is attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The peer was unreachable or refused the connection.
    #[error("failed to connect to {peer}: {source}")]
    Connect {
        /// Peer address.
        peer: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A bounded operation exceeded its timeout.
    #[error("operation timed out")]
    Timeout,

    /// Mid-transfer I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The push was cancelled by the shutdown signal.
    #[error("push cancelled")]
    Cancelled,
}

impl SyncError {
    /// Returns true if the caller may retry this push later.
    ///
    /// Configuration errors are permanent until the configuration changes,
    /// and a cancelled push must not be retried during shutdown.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Connect { .. } | SyncError::Timeout | SyncError::Io(_)
        )
    }
}
