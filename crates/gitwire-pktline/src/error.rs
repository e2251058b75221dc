//! Pkt-line framing error types.

use thiserror::Error;

/// Errors that can occur while reading or writing pkt-line packets.
#[derive(Debug, Error)]
pub enum PktLineError {
    /// The 4-byte length header was not a valid hex length.
    #[error("invalid pkt-line length: {0}")]
    InvalidLength(String),

    /// A data payload exceeds the pkt-line maximum.
    #[error("pkt-line payload too long: {len} bytes (max {max})")]
    TooLong {
        /// The actual payload size.
        len: usize,
        /// The maximum allowed payload size.
        max: usize,
    },

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for pkt-line operations.
pub type Result<T> = std::result::Result<T, PktLineError>;
