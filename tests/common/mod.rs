//! Shared helpers for the integration tests.

#![allow(dead_code)] // not every test file uses every helper

use encvault::{Api, ApiState, Bytes, ChainHash, DataHeader, HashMode, Password};
use std::path::{Path, PathBuf};

/// The password used by most scenarios.
pub const PASSWORD: &str = "Password";

/// Builds a header with NORMAL/NORMAL chainhashes at the given
/// iteration count and calculates its bytes for `PASSWORD`.
pub fn normal_header(hash_mode: HashMode, iters: u64) -> (DataHeader, Bytes) {
    let chainhash1 = ChainHash::normal(iters).unwrap();
    let chainhash2 = ChainHash::normal(iters).unwrap();
    let pwhash = chainhash1.perform(hash_mode, PASSWORD.as_bytes()).unwrap();
    let validator = chainhash2.perform(hash_mode, pwhash.as_slice()).unwrap();

    let mut header = DataHeader::new(hash_mode);
    header.set_file_mode(1).unwrap();
    header.set_chainhash1(chainhash1).unwrap();
    header.set_chainhash2(chainhash2).unwrap();
    header.set_valid_passwordhash(validator).unwrap();
    header.calc_header_bytes(&pwhash, true).unwrap();
    (header, pwhash)
}

/// A pseudo-random but deterministic payload of the given size.
pub fn patterned_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 257) % 256) as u8).collect()
}

/// Creates an empty container in `dir` and drives an API to the
/// DECRYPTED state on it with fast NORMAL/NORMAL settings.
pub fn fresh_decrypted_api(dir: &Path, name: &str) -> (Api, PathBuf) {
    let path = dir.join(name);
    let mut api = Api::new(1).unwrap();
    api.create_file(&path).unwrap();
    api.select_file(&path).unwrap();
    let settings = encvault::HeaderSettingsIters {
        file_mode: 1,
        hash_mode: HashMode::Sha256,
        chainhash1_mode: encvault::ChainHashMode::Normal,
        chainhash1_iters: 1000,
        chainhash2_mode: encvault::ChainHashMode::Normal,
        chainhash2_iters: 1000,
    };
    api.create_data_header(&Password::new(PASSWORD), &settings, 0)
        .unwrap();
    assert_eq!(api.state(), ApiState::Decrypted);
    (api, path)
}
