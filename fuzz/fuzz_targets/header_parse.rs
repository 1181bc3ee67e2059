//! Fuzz target for DataHeader::parse with arbitrary byte input.
//!
//! This target exercises the header parsing code with potentially
//! malformed or adversarial input. The goal is to find panics, hangs, or
//! unbounded allocations in the parsing logic: every malformed header
//! must come back as an error, never a crash.
//!
//! Run with: cargo +nightly fuzz run header_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);

    // We don't care about the result - we're looking for panics
    if let Ok(header) = encvault::DataHeader::parse(&mut cursor) {
        // a parsed header must re-serialize and agree with itself
        let bytes = header.header_bytes().expect("parsed header has bytes");
        let mut reparse = Cursor::new(bytes.to_vec());
        let again = encvault::DataHeader::parse(&mut reparse).expect("re-parse");
        assert_eq!(again, header);
    }
});
