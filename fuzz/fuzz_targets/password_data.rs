//! Fuzz target for PasswordData parsing with arbitrary record bytes.
//!
//! Decrypting with a wrong-but-validating password (or a corrupted
//! payload) feeds arbitrary bytes into the record parser; it must reject
//! them gracefully.
//!
//! Run with: cargo +nightly fuzz run password_data

#![no_main]

use libfuzzer_sys::fuzz_target;

use encvault::{Bytes, FileDataStruct, PasswordData};

fuzz_target!(|data: &[u8]| {
    let carrier = FileDataStruct::new(1, Bytes::from_slice(data)).expect("mode 1 is valid");
    if let Ok(records) = PasswordData::from_file_data(&carrier) {
        // whatever parsed must serialize and parse back identically
        let bytes = records.to_file_data().expect("serializable");
        let again = PasswordData::from_file_data(&bytes).expect("round trip");
        assert_eq!(again, records);
    }
});
