//! Packet framing: the length-prefixed wire unit and its reader/writer.

use crate::{PktLineError, Result};
use std::io::{ErrorKind, Read, Write};

/// Maximum number of payload bytes in a single data packet.
///
/// The length header is 4 hex digits, so a packet is at most 65520 bytes
/// including the header itself.
pub const MAX_DATA_LEN: usize = 65516;

/// One pkt-line packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Data packet carrying an opaque payload.
    Data(Vec<u8>),
    /// Flush packet (`0000`).
    Flush,
    /// Delimiter packet (`0001`, protocol v2 only).
    Delim,
    /// Response-end packet (`0002`, protocol v2 only).
    ResponseEnd,
}

impl Packet {
    /// Builds a data packet from a text line, appending a newline when
    /// the line lacks one.
    #[must_use]
    pub fn line(s: &str) -> Self {
        let mut data = s.as_bytes().to_vec();
        if !s.ends_with('\n') {
            data.push(b'\n');
        }
        Self::Data(data)
    }

    /// Serializes the packet into its wire form.
    ///
    /// Data payloads must not exceed [`MAX_DATA_LEN`]; a longer payload
    /// cannot be expressed in the 4-hex-digit header and is a caller
    /// contract violation. [`PacketWriter::write`] reports it as
    /// [`PktLineError::TooLong`] instead.
    ///
    /// # Panics
    ///
    /// Debug builds assert the payload cap.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Data(data) => {
                debug_assert!(
                    data.len() <= MAX_DATA_LEN,
                    "pkt-line payload of {} bytes exceeds {MAX_DATA_LEN}",
                    data.len()
                );
                let mut wire = format!("{:04x}", data.len() + 4).into_bytes();
                wire.extend_from_slice(data);
                wire
            }
            Self::Flush => b"0000".to_vec(),
            Self::Delim => b"0001".to_vec(),
            Self::ResponseEnd => b"0002".to_vec(),
        }
    }

    /// Returns the payload of a data packet, `None` for the reserved codes.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }
}

/// Reads packets off a byte stream, one per call.
pub struct PacketReader<R> {
    reader: R,
}

impl<R: Read> PacketReader<R> {
    /// Creates a reader over `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next packet, or `None` at end of input.
    ///
    /// End of input is only clean at a packet boundary; a stream that
    /// ends inside a length header or payload yields an I/O error.
    ///
    /// # Errors
    ///
    /// Returns [`PktLineError::InvalidLength`] for a malformed length
    /// header and [`PktLineError::Io`] for stream errors.
    pub fn read(&mut self) -> Result<Option<Packet>> {
        let mut header = [0u8; 4];
        match self.reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        match &header {
            b"0000" => return Ok(Some(Packet::Flush)),
            b"0001" => return Ok(Some(Packet::Delim)),
            b"0002" => return Ok(Some(Packet::ResponseEnd)),
            _ => {}
        }

        let len = std::str::from_utf8(&header)
            .ok()
            .and_then(|s| u16::from_str_radix(s, 16).ok())
            .ok_or_else(|| PktLineError::InvalidLength(String::from_utf8_lossy(&header).into_owned()))?
            as usize;
        if len < 4 {
            return Err(PktLineError::InvalidLength(format!("{len:04x}")));
        }

        let mut data = vec![0u8; len - 4];
        self.reader.read_exact(&mut data)?;
        Ok(Some(Packet::Data(data)))
    }

    /// Consumes the reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Writes packets onto a byte stream.
pub struct PacketWriter<W> {
    writer: W,
}

impl<W: Write> PacketWriter<W> {
    /// Creates a writer over `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Serializes one packet onto the stream.
    ///
    /// # Errors
    ///
    /// Returns [`PktLineError::TooLong`] when a data payload does not fit
    /// in one packet, and [`PktLineError::Io`] for stream errors.
    pub fn write(&mut self, packet: &Packet) -> Result<()> {
        if let Packet::Data(data) = packet {
            if data.len() > MAX_DATA_LEN {
                return Err(PktLineError::TooLong {
                    len: data.len(),
                    max: MAX_DATA_LEN,
                });
            }
        }
        self.writer.write_all(&packet.encode())?;
        Ok(())
    }

    /// Writes a text line as a data packet.
    ///
    /// # Errors
    ///
    /// Same as [`PacketWriter::write`].
    pub fn write_line(&mut self, s: &str) -> Result<()> {
        self.write(&Packet::line(s))
    }

    /// Writes a flush packet.
    ///
    /// # Errors
    ///
    /// Same as [`PacketWriter::write`].
    pub fn flush_pkt(&mut self) -> Result<()> {
        self.write(&Packet::Flush)
    }

    /// Flushes the underlying stream.
    ///
    /// # Errors
    ///
    /// Returns [`PktLineError::Io`] for stream errors.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
