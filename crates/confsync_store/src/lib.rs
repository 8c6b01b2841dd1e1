//! # ConfSync Store
//!
//! Thread-safe shared configuration store for ConfSync.
//!
//! This crate provides:
//! - `ConfigStore`, the single source of truth both sync roles read and write
//! - `ConfigEntry`, the transient `(section, key, value)` triple the frame
//!   codec produces and consumes
//! - `AppliedChange`, the per-entry change report that drives update logging
//!
//! This is a pure state crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entry;
mod store;

pub use entry::{AppliedChange, ConfigEntry};
pub use store::ConfigStore;
