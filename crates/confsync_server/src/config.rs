//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the inbound sync listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Idle timeout for each read while receiving a header or body.
    ///
    /// Deliberately longer than the connect/write timeouts elsewhere: a
    /// slow peer mid-transfer gets more slack than a new connection.
    pub idle_read_timeout: Duration,
    /// Bound on each individual write while replying to a pull request.
    pub write_timeout: Duration,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            idle_read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(5),
        }
    }

    /// Sets the idle read timeout.
    pub fn with_idle_read_timeout(mut self, timeout: Duration) -> Self {
        self.idle_read_timeout = timeout;
        self
    }

    /// Sets the per-write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], 12348)))
    }
}
