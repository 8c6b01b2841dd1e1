//! # ConfSync Engine
//!
//! Outbound sync client for ConfSync.
//!
//! This crate provides:
//! - `SyncClient`, which pushes the current configuration to a peer as one
//!   length-prefixed frame
//! - `ClientConfig` with connect/write timeouts
//! - `SyncError` classification (configuration vs. connectivity vs. I/O)
//!
//! ## Cancellation
//!
//! Every blocking step (connect, each write) is raced against the
//! process-wide `CancellationToken`, so a push in flight aborts promptly on
//! shutdown instead of blocking for its full timeout.
//!
//! Push failures are reported to the caller and are never fatal: the caller
//! may simply retry on the next trigger.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;

pub use client::{PushOutcome, SyncClient};
pub use config::ClientConfig;
pub use error::{SyncError, SyncResult};
