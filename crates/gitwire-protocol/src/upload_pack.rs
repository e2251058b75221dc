//! Protocol v1 `git-upload-pack` response stream.
//!
//! The server side of fetch negotiation answers with an ordered response:
//! optional `shallow`/`unshallow` lines closed by a flush, optional
//! `ACK`/`NAK` lines, then the pack stream terminated by a flush. Several
//! phases may be skipped entirely, so each packet is classified against a
//! cascade of rules in phase order rather than a single per-phase match.

use crate::{ProtocolError, Result};
use gitwire_pktline::{Packet, PacketReader, PacketWriter};
use std::io::{Read, Write};
use tracing::trace;

/// One event of a protocol v1 upload-pack response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPackEvent {
    /// `shallow <id>`: the server declares a new shallow boundary.
    Shallow(String),
    /// `unshallow <id>`: the object is no longer a shallow boundary.
    Unshallow(String),
    /// Flush closing the shallow/unshallow phase.
    EndOfShallows,
    /// `ACK <id> [<detail>]`: the object is common to both sides.
    Ack {
        /// The acknowledged object id.
        id: String,
        /// Optional qualifier such as `continue` or `ready`.
        detail: Option<String>,
    },
    /// `NAK`: no common objects were found.
    Nak,
    /// One fragment of the pack stream; never empty.
    PackData(Vec<u8>),
    /// Flush terminating the whole response.
    EndOfResponse,
}

impl UploadPackEvent {
    /// Serializes the event into the packet a server would send for it.
    #[must_use]
    pub fn to_packet(&self) -> Packet {
        match self {
            Self::Shallow(id) => Packet::Data(format!("shallow {id}\n").into_bytes()),
            Self::Unshallow(id) => Packet::Data(format!("unshallow {id}\n").into_bytes()),
            Self::EndOfShallows | Self::EndOfResponse => Packet::Flush,
            // An absent and an empty detail share one wire form.
            Self::Ack { id, detail } => match detail.as_deref().filter(|d| !d.is_empty()) {
                Some(detail) => Packet::Data(format!("ACK {id} {detail}\n").into_bytes()),
                None => Packet::Data(format!("ACK {id}\n").into_bytes()),
            },
            Self::Nak => Packet::Data(b"NAK\n".to_vec()),
            Self::PackData(bytes) => Packet::Data(bytes.clone()),
        }
    }

    /// Writes the event's wire form to a packet sink.
    ///
    /// # Errors
    ///
    /// Propagates pkt-line framing and I/O errors.
    pub fn write_to<W: Write>(&self, writer: &mut PacketWriter<W>) -> gitwire_pktline::Result<()> {
        writer.write(&self.to_packet())
    }
}

/// Decoder phase, in strict response order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Begin,
    ScanShallows,
    ScanUnshallows,
    AwaitAcks,
    ScanAcks,
    ScanPacks,
    Done,
}

/// Pull-based decoder for a protocol v1 upload-pack response.
///
/// Call [`advance`](Self::advance) in a loop; each call reads exactly one
/// packet and, on `true`, exposes the decoded event via
/// [`event`](Self::event). Once `advance` returns `false` the session is
/// over: [`error`](Self::error) reports what stopped it, `None` meaning a
/// clean end of the response.
///
/// One decoder owns one response stream; it holds mutable phase state and
/// is not meant to be shared.
pub struct UploadPackResponse<R> {
    reader: PacketReader<R>,
    phase: Phase,
    event: Option<UploadPackEvent>,
    error: Option<ProtocolError>,
}

impl<R: Read> UploadPackResponse<R> {
    /// Creates a decoder reading packets from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader: PacketReader::new(reader),
            phase: Phase::Begin,
            event: None,
            error: None,
        }
    }

    /// Decodes the next event, returning `false` when the session stopped.
    ///
    /// After a stop every further call returns `false` without reading
    /// from the underlying stream.
    pub fn advance(&mut self) -> bool {
        if self.error.is_some() || self.phase == Phase::Done {
            return false;
        }
        let packet = match self.reader.read() {
            Ok(Some(packet)) => packet,
            Ok(None) => {
                // Ending right after the shallow-phase flush is the one
                // legal short response (a negotiation-only exchange).
                if self.phase != Phase::AwaitAcks {
                    self.error = Some(ProtocolError::PrematureEof);
                }
                self.phase = Phase::Done;
                return false;
            }
            Err(err) => {
                self.error = Some(err.into());
                self.phase = Phase::Done;
                return false;
            }
        };
        match self.classify(packet) {
            Ok(event) => {
                trace!(phase = ?self.phase, ?event, "decoded upload-pack event");
                self.event = Some(event);
                true
            }
            Err(err) => {
                self.error = Some(err);
                self.phase = Phase::Done;
                false
            }
        }
    }

    /// The event produced by the most recent successful [`advance`](Self::advance).
    pub fn event(&self) -> Option<&UploadPackEvent> {
        self.event.as_ref()
    }

    /// The first error encountered, or `None` after a clean finish.
    pub fn error(&self) -> Option<&ProtocolError> {
        self.error.as_ref()
    }

    /// Classifies one packet against the phase rule cascade.
    ///
    /// Rules are tried top to bottom; a rule applies when the phase on
    /// entry has not yet moved past it, so a packet that a narrower
    /// phase does not recognize falls through to the broader rules below.
    fn classify(&mut self, packet: Packet) -> Result<UploadPackEvent> {
        let entered = self.phase;

        if entered <= Phase::ScanShallows {
            if let Some(id) = keyword_line(&packet, "shallow")? {
                self.phase = Phase::ScanShallows;
                return Ok(UploadPackEvent::Shallow(id));
            }
        }

        if entered <= Phase::ScanUnshallows {
            if let Some(id) = keyword_line(&packet, "unshallow")? {
                self.phase = Phase::ScanUnshallows;
                return Ok(UploadPackEvent::Unshallow(id));
            }
            if packet == Packet::Flush {
                self.phase = Phase::AwaitAcks;
                return Ok(UploadPackEvent::EndOfShallows);
            }
        }

        if entered <= Phase::ScanAcks {
            if let Some(rest) = keyword_line(&packet, "ACK")? {
                let (id, detail) = match rest.split_once(' ') {
                    Some((id, detail)) if detail.is_empty() => (id.to_string(), None),
                    Some((id, detail)) => (id.to_string(), Some(detail.to_string())),
                    None => (rest, None),
                };
                if id.is_empty() {
                    return Err(malformed("ACK", &packet));
                }
                self.phase = Phase::ScanAcks;
                return Ok(UploadPackEvent::Ack { id, detail });
            }
            if packet.data() == Some(b"NAK\n".as_slice()) {
                self.phase = Phase::ScanPacks;
                return Ok(UploadPackEvent::Nak);
            }
            // Nothing matched at all for the very first packet of the
            // response: it belongs to no phase.
            if entered == Phase::Begin {
                return Err(ProtocolError::UnexpectedPacket(describe(&packet)));
            }
        }

        match packet {
            Packet::Flush => {
                self.phase = Phase::Done;
                Ok(UploadPackEvent::EndOfResponse)
            }
            Packet::Data(data) if !data.is_empty() => {
                self.phase = Phase::ScanPacks;
                Ok(UploadPackEvent::PackData(data))
            }
            other => Err(ProtocolError::UnexpectedPacket(describe(&other))),
        }
    }
}

/// Matches a `"<keyword> <rest>\n"` text packet.
///
/// Returns the text after the keyword and separating space, `None` when
/// the packet is not a line introduced by `keyword` (the caller falls
/// through to its next rule), and a [`ProtocolError::MalformedLine`] when
/// the keyword is present but what follows is empty or not text.
fn keyword_line(packet: &Packet, keyword: &'static str) -> Result<Option<String>> {
    let Some(data) = packet.data() else {
        return Ok(None);
    };
    let line = data.strip_suffix(b"\n").unwrap_or(data);
    if line == keyword.as_bytes() {
        return Err(malformed(keyword, packet));
    }
    let Some(rest) = line
        .strip_prefix(keyword.as_bytes())
        .and_then(|r| r.strip_prefix(b" "))
    else {
        return Ok(None);
    };
    match std::str::from_utf8(rest) {
        Ok(rest) if !rest.is_empty() => Ok(Some(rest.to_string())),
        _ => Err(malformed(keyword, packet)),
    }
}

fn malformed(keyword: &'static str, packet: &Packet) -> ProtocolError {
    let line = packet.data().unwrap_or_default();
    ProtocolError::MalformedLine {
        keyword,
        line: String::from_utf8_lossy(line).into_owned(),
    }
}

/// Diagnostic rendering of a packet for error messages; long payloads are
/// truncated.
fn describe(packet: &Packet) -> String {
    match packet {
        Packet::Flush => "flush-pkt".to_string(),
        Packet::Delim => "delim-pkt".to_string(),
        Packet::ResponseEnd => "response-end-pkt".to_string(),
        Packet::Data(data) => {
            let head = &data[..data.len().min(32)];
            format!(
                "{}-byte data packet {:?}",
                data.len(),
                String::from_utf8_lossy(head)
            )
        }
    }
}
