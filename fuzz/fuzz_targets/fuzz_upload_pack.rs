//! Fuzz target for the upload-pack response decoder.
//!
//! Drives the full phase grammar over arbitrary byte streams; malformed
//! input must surface as a decode error, never a panic.

#![no_main]

use gitwire_protocol::UploadPackResponse;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut resp = UploadPackResponse::new(Cursor::new(data));

    let mut stopped = false;
    for _ in 0..256 {
        if !resp.advance() {
            stopped = true;
            break;
        }
    }

    // A stopped decoder stays stopped and keeps its first error.
    if stopped {
        let reported = resp.error().map(ToString::to_string);
        assert!(!resp.advance());
        assert_eq!(resp.error().map(ToString::to_string), reported);
    }
});
