//! # Gitwire protocol
//!
//! Typed decoding and encoding of the git smart protocol, version 1.
//!
//! The entry point is [`UploadPackResponse`], a pull-based decoder that
//! turns the pkt-line stream a `git-upload-pack` server sends back during
//! fetch negotiation into a sequence of [`UploadPackEvent`] values:
//! shallow/unshallow announcements, ACK/NAK negotiation results, and the
//! raw pack stream. [`UploadPackEvent::to_packet`] is the inverse,
//! producing the exact packet a server would send for an event.
//!
//! Pack bytes are passed through opaquely; this crate does not interpret
//! pack contents, ref advertisements, or protocol v2.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod upload_pack;

pub use error::{ProtocolError, Result};
pub use upload_pack::{UploadPackEvent, UploadPackResponse};
