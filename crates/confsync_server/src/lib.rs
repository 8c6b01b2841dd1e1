//! # ConfSync Server
//!
//! Inbound sync listener for ConfSync.
//!
//! This crate provides:
//! - `SyncListener`, the TCP accept loop with cooperative shutdown
//! - the per-connection protocol state machine
//!   (`ReadHeader → ReadBody → Dispatch → Closed`)
//! - `ServerConfig` and `ServerError`
//!
//! ## Protocol
//!
//! Each connection carries one frame. A zero-length frame is a pull
//! request: the listener replies with its full current configuration on the
//! same connection. A non-zero frame is a push: the body is decoded and
//! applied to the shared store, and every changed value is logged.
//!
//! ## Shutdown
//!
//! The accept loop races `accept()` against a `CancellationToken`; on
//! cancellation it stops accepting, closes the listening socket, and waits
//! for in-flight connection handlers to drain. A handler mid-body is not
//! forcibly aborted: it completes or hits its own idle read timeout.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod handler;
mod listener;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::ConnectionOutcome;
pub use listener::SyncListener;
