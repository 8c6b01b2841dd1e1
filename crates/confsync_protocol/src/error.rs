//! Error types for the frame codec.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while parsing a frame.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// The header line is not an unsigned decimal number.
    #[error("invalid frame header: {0:?}")]
    InvalidHeader(String),

    /// The header line exceeded the allowed length before its terminator.
    #[error("frame header too long: {len} > {max} characters")]
    HeaderTooLong {
        /// Accumulated header length.
        len: usize,
        /// Maximum allowed header length.
        max: usize,
    },

    /// The declared body length exceeds the allowed maximum.
    #[error("frame body too large: {len} > {max} bytes")]
    BodyTooLarge {
        /// Declared body length.
        len: u64,
        /// Maximum allowed body length.
        max: usize,
    },
}
