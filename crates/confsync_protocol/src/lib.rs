//! # ConfSync Protocol
//!
//! Wire frame codec for the ConfSync TCP link.
//!
//! A frame is an ASCII decimal length, a newline, and exactly that many
//! bytes of body:
//!
//! ```text
//! <decimal length>\n[SECTION]KEY=VALUE\n[SECTION]KEY=VALUE\n...
//! ```
//!
//! A frame with a zero-length body is a pull request: the receiver replies
//! on the same connection with a frame holding its full configuration.
//!
//! This crate provides:
//! - `encode_body` / `encode_frame` for the outbound path
//! - `decode_body` for applying a received body to the store
//! - `parse_header` and the header/body size limits
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod error;

pub use codec::{
    decode_body, encode_body, encode_frame, parse_header, MAX_BODY_LEN, MAX_HEADER_LEN,
};
pub use error::{CodecError, CodecResult};
