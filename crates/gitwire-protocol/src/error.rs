//! Protocol error types.

use gitwire_pktline::PktLineError;
use thiserror::Error;

/// Errors that can occur while decoding an upload-pack response.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A `shallow`, `unshallow` or `ACK` line is missing its object id.
    #[error("cannot split {keyword} line: {line:?}")]
    MalformedLine {
        /// The keyword the line started with.
        keyword: &'static str,
        /// The offending line, rendered lossily as text.
        line: String,
    },

    /// A packet that is not legal in the current phase of the response.
    #[error("unexpected packet: {0}")]
    UnexpectedPacket(String),

    /// The stream ended where the response grammar requires more packets.
    #[error("early EOF in upload-pack response")]
    PrematureEof,

    /// Framing or transport error, propagated from the pkt-line layer.
    #[error(transparent)]
    PktLine(#[from] PktLineError),
}

impl ProtocolError {
    /// Returns true for the syntax error kinds, false for transport errors.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        !matches!(self, Self::PktLine(_))
    }
}

/// A specialized Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
