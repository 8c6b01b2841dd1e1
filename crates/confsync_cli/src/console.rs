//! Interactive command loop.

use crate::ini;
use confsync_engine::SyncClient;
use confsync_store::ConfigStore;
use std::io;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Pushes the current configuration to the peer named in the store itself
/// (`CONFIG_SYNC` section), reporting but never propagating failures.
pub(crate) async fn push_once(client: &SyncClient, store: &ConfigStore) {
    let host = store.get("CONFIG_SYNC", "PEER_HOST", "192.168.4.10");
    let port = store.get("CONFIG_SYNC", "PEER_PORT", "12347");

    match client.push_current_config(&host, &port).await {
        Ok(outcome) => {
            info!(
                bytes_sent = outcome.bytes_sent,
                entries = outcome.entries,
                "pushed configuration to peer"
            );
        }
        Err(e) => {
            warn!(error = %e, retryable = e.is_retryable(), "push failed");
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  <enter>  push current configuration to peer");
    println!("  s        show configuration");
    println!("  t        show configuration statistics");
    println!("  w        save configuration to disk");
    println!("  r        reload configuration file and push");
    println!("  q        quit");
}

fn print_config(store: &ConfigStore) {
    println!("=== current configuration ===");
    let mut current: Option<String> = None;
    for entry in store.snapshot() {
        if current.as_deref() != Some(entry.section.as_str()) {
            println!("[{}]", entry.section);
            current = Some(entry.section.clone());
        }
        println!("  {} = {}", entry.key, entry.value);
    }
    println!("=============================");
}

fn print_stats(store: &ConfigStore) {
    println!("=== configuration statistics ===");
    println!("sections: {}", store.section_count());
    for section in store.sections() {
        println!("  [{}]: {} keys", section, store.section_len(&section));
    }
    println!("total keys: {}", store.entry_count());
    println!("================================");
}

/// Runs the command loop until `q`, stdin EOF, or cancellation.
pub(crate) async fn run(
    config_path: &Path,
    store: &ConfigStore,
    client: &SyncClient,
    token: &CancellationToken,
) -> io::Result<()> {
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = token.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        match line.trim() {
            "q" => break,
            "s" => print_config(store),
            "t" => print_stats(store),
            "w" => match ini::save(config_path, &store.snapshot()) {
                Ok(()) => info!(path = %config_path.display(), "configuration saved"),
                Err(e) => warn!(error = %e, "failed to save configuration"),
            },
            "r" => match ini::load(config_path) {
                Ok(sections) => {
                    store.replace(sections);
                    info!(
                        sections = store.section_count(),
                        entries = store.entry_count(),
                        "configuration reloaded"
                    );
                    push_once(client, store).await;
                }
                Err(e) => warn!(error = %e, "failed to reload configuration"),
            },
            _ => push_once(client, store).await,
        }
    }

    Ok(())
}
