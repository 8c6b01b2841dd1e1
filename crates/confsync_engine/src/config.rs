//! Configuration for the sync client.

use std::time::Duration;

/// Configuration for outbound pushes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Total bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Bound on each individual write while sending a frame.
    pub write_timeout: Duration,
}

impl ClientConfig {
    /// Creates the default client configuration.
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
        }
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
