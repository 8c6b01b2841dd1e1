//! The TCP accept loop.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::handle_connection;
use confsync_store::ConfigStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Listens for peer connections and dispatches each to the protocol state
/// machine.
///
/// Binding is the only fatal failure; everything after that is absorbed at
/// the connection boundary. Each accepted connection runs in its own
/// tracked task, and [`SyncListener::run`] drains those tasks after the
/// cancellation token stops the accept loop.
///
/// # Example
///
/// ```rust,ignore
/// use confsync_server::{ServerConfig, SyncListener};
///
/// let listener = SyncListener::bind(config, store, token.clone()).await?;
/// tokio::spawn(listener.run());
/// // ... later:
/// token.cancel();
/// ```
pub struct SyncListener {
    listener: TcpListener,
    store: Arc<ConfigStore>,
    config: ServerConfig,
    token: CancellationToken,
    tracker: TaskTracker,
}

impl SyncListener {
    /// Binds the listening socket.
    pub async fn bind(
        config: ServerConfig,
        store: Arc<ConfigStore>,
        token: CancellationToken,
    ) -> ServerResult<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        info!(addr = %listener.local_addr()?, "listening for configuration updates");

        Ok(Self {
            listener,
            store,
            config,
            token,
            tracker: TaskTracker::new(),
        })
    }

    /// Returns the bound local address.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop until the cancellation token fires.
    ///
    /// On cancellation the loop exits, the listening socket closes, and
    /// in-flight connection handlers are drained before this returns.
    pub async fn run(self) -> ServerResult<()> {
        loop {
            tokio::select! {
                _ = self.token.cancelled() => {
                    info!("shutdown requested, closing listener");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            debug!(%addr, "accepted connection");
                            let store = Arc::clone(&self.store);
                            let config = self.config.clone();
                            let token = self.token.clone();
                            self.tracker.spawn(async move {
                                let mut stream = stream;
                                match handle_connection(&mut stream, &store, &config, &token).await {
                                    Ok(outcome) => {
                                        debug!(%addr, ?outcome, "connection finished");
                                    }
                                    Err(e) if e.is_protocol_violation() => {
                                        warn!(%addr, error = %e, "rejected connection");
                                    }
                                    Err(e) => {
                                        warn!(%addr, error = %e, "connection failed");
                                    }
                                }
                                // Socket drops (and closes) here on every path.
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                        }
                    }
                }
            }
        }

        // Best-effort drain: handlers finish or hit their own timeouts.
        self.tracker.close();
        self.tracker.wait().await;
        Ok(())
    }
}
