//! ConfSync agent
//!
//! Keeps an INI-style configuration in agreement with a remote peer over a
//! private TCP link. The agent loads the configuration file, listens for
//! pushes and pull requests from the peer, and pushes its own configuration
//! on demand from an interactive command loop.

mod console;
mod ini;

use clap::Parser;
use confsync_engine::{ClientConfig, SyncClient};
use confsync_server::{ServerConfig, SyncListener};
use confsync_store::ConfigStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Configuration synchronization agent.
#[derive(Parser)]
#[command(name = "confsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the INI configuration file
    #[arg(default_value = "config.ini")]
    config: PathBuf,

    /// Override the listen port from the configuration file
    #[arg(short, long)]
    listen_port: Option<u16>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Initial load is the only fatal configuration error.
    let sections = ini::load(&cli.config)?;
    let store = Arc::new(ConfigStore::from_sections(sections));
    info!(
        path = %cli.config.display(),
        sections = store.section_count(),
        entries = store.entry_count(),
        "configuration loaded"
    );

    let token = CancellationToken::new();
    let tracker = TaskTracker::new();

    // Inbound listener: the port comes from the configuration itself unless
    // overridden on the command line. A bind failure is fatal.
    let listen_port = match cli.listen_port {
        Some(port) => port,
        None => store.get("CONFIG_SYNC", "LISTEN_PORT", "12348").parse()?,
    };
    let bind_addr = SocketAddr::from(([0, 0, 0, 0], listen_port));
    let listener =
        SyncListener::bind(ServerConfig::new(bind_addr), Arc::clone(&store), token.clone()).await?;
    tracker.spawn(listener.run());

    let client = SyncClient::new(Arc::clone(&store), ClientConfig::new(), token.clone());

    // OS-signal adapter: the only place signals touch the token.
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            signal_token.cancel();
        }
    });

    // Give the peer's listener a moment, then announce our configuration.
    tokio::time::sleep(Duration::from_secs(1)).await;
    console::push_once(&client, &store).await;

    console::run(&cli.config, &store, &client, &token).await?;

    // Cooperative shutdown: stop the listener and wait for it to drain.
    token.cancel();
    tracker.close();
    tracker.wait().await;
    info!("shutdown complete");

    Ok(())
}
