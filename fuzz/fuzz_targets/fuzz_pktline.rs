//! Fuzz target for pkt-line framing.
//!
//! Tests that the packet reader handles arbitrary input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut reader = gitwire_pktline::PacketReader::new(Cursor::new(data));

    // Bounded so crafted input cannot loop forever.
    for _ in 0..100 {
        match reader.read() {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(_) => break, // Errors are expected for malformed input.
        }
    }
});
