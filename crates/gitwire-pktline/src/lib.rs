//! # Gitwire pkt-line
//!
//! The pkt-line framing format used by the git wire protocols.
//!
//! Every unit on the wire is a packet: either a data packet prefixed with
//! a 4-character hex length (the length counts the prefix itself), or one
//! of the reserved 4-byte codes `0000` (flush), `0001` (delimiter) and
//! `0002` (response-end). This crate only frames and de-frames packets;
//! it assigns no meaning to their contents.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod packet;

pub use error::{PktLineError, Result};
pub use packet::{Packet, PacketReader, PacketWriter, MAX_DATA_LEN};
