//! File handle integrity checks on real files.

mod common;

use encvault::{Bytes, DecDatablock, ErrorKind, FileHandle, HashMode};
use tempfile::tempdir;

/// Writes a header-only container and returns its handle and bytes.
fn written_container(dir: &std::path::Path) -> (FileHandle, Vec<u8>) {
    let (mut header, _) = common::normal_header(HashMode::Sha256, 1000);
    let total = header.header_size().unwrap();
    header.set_file_size(total).unwrap();
    let bytes = header.header_bytes().unwrap().to_vec();

    let mut handle = FileHandle::create(dir.join("store.enc")).unwrap();
    handle.write_bytes_if_empty(&bytes).unwrap();
    (handle, bytes)
}

#[test]
fn update_succeeds_after_write() {
    let dir = tempdir().unwrap();
    let (mut handle, bytes) = written_container(dir.path());
    handle.update().unwrap();
    let header = handle.get_data_header().unwrap();
    assert_eq!(header.file_size(), bytes.len() as u64);
    assert_eq!(handle.header_size().unwrap(), bytes.len() as u64);
}

#[test]
fn header_only_file_has_minimum_size() {
    let dir = tempdir().unwrap();
    let (handle, _) = written_container(dir.path());
    // 16 + 22 + 2 * 32 for SHA-256 with empty datablocks
    assert_eq!(handle.file_size().unwrap(), 102);
}

#[test]
fn corrupting_structural_header_bytes_fails_update() {
    let dir = tempdir().unwrap();
    let (_, bytes) = written_container(dir.path());

    // every offset whose value is structurally checked: the two size
    // prefixes, the mode bytes, the high iteration bytes and the
    // datablock length bytes (opaque bytes like the validator are only
    // caught at password verification, see verify_rejects_corrupted_validator)
    let structural: Vec<usize> = (0..23).chain([27, 28, 29, 30, 31, 32, 37]).collect();
    for offset in structural {
        let mut corrupted = bytes.clone();
        corrupted[offset] ^= 0x01;

        let subdir = dir.path().join(format!("case{offset}"));
        std::fs::create_dir(&subdir).unwrap();
        let mut handle = FileHandle::create(subdir.join("store.enc")).unwrap();
        handle.write_bytes(&corrupted).unwrap();
        assert!(
            handle.update().is_err(),
            "corruption at offset {offset} went unnoticed"
        );
    }
}

#[test]
fn verify_rejects_corrupted_validator() {
    use encvault::{Api, Password};

    let dir = tempdir().unwrap();
    let (_, mut bytes) = written_container(dir.path());
    // flip one bit inside the valid_passwordhash region (starts at 38
    // for a SHA-256 header with empty datablocks)
    bytes[40] ^= 0x01;

    let path = dir.path().join("tampered.enc");
    std::fs::write(&path, &bytes).unwrap();

    let mut api = Api::new(1).unwrap();
    api.select_file(&path).unwrap();
    let err = api
        .verify_password(&Password::new(common::PASSWORD), 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PasswordInvalid);
}

#[test]
fn update_rejects_appended_garbage() {
    let dir = tempdir().unwrap();
    let (mut handle, mut bytes) = written_container(dir.path());
    // appended bytes make the on-disk size disagree with file_size
    bytes.push(0xFF);
    handle.write_bytes(&bytes).unwrap();
    let err = handle.update().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LengthInvalid);
}

#[test]
fn update_rejects_truncation() {
    let dir = tempdir().unwrap();
    let (mut handle, bytes) = written_container(dir.path());
    handle.write_bytes(&bytes[..bytes.len() - 4]).unwrap();
    assert!(handle.update().is_err());
}

#[test]
fn data_stream_starts_after_header() {
    let dir = tempdir().unwrap();
    let (mut header, _) = common::normal_header(HashMode::Sha256, 1000);
    let payload = b"ciphertext bytes";
    let total = header.header_size().unwrap() + payload.len() as u64;
    header.set_file_size(total).unwrap();
    let mut bytes = header.header_bytes().unwrap().to_vec();
    bytes.extend_from_slice(payload);

    let mut handle = FileHandle::create(dir.path().join("data.enc")).unwrap();
    handle.write_bytes(&bytes).unwrap();
    handle.update().unwrap();

    let mut reader = handle.get_data_stream().unwrap();
    let mut tail = Vec::new();
    std::io::Read::read_to_end(&mut reader, &mut tail).unwrap();
    assert_eq!(tail, payload);
}

#[test]
fn is_data_header_cheap_check() {
    let dir = tempdir().unwrap();
    let (handle, _) = written_container(dir.path());
    assert!(handle.is_data_header(1).unwrap());
    assert!(!handle.is_data_header(2).unwrap());

    let empty = FileHandle::create(dir.path().join("empty.enc")).unwrap();
    assert!(!empty.is_data_header(1).unwrap());
}

#[test]
fn dec_datablocks_parse_from_disk() {
    let dir = tempdir().unwrap();
    let (mut header, pwhash) = common::normal_header(HashMode::Sha256, 1000);
    header
        .add_dec_datablock(DecDatablock {
            dtype: 4,
            data: Bytes::from_slice(b"on disk"),
        })
        .unwrap();
    header.calc_header_bytes(&pwhash, true).unwrap();
    let total = header.header_size().unwrap();
    header.set_file_size(total).unwrap();

    let mut handle = FileHandle::create(dir.path().join("meta.enc")).unwrap();
    handle
        .write_bytes(&header.header_bytes().unwrap().to_vec())
        .unwrap();
    let parsed = handle.get_data_header().unwrap();
    assert_eq!(parsed.dec_datablocks().len(), 1);
    assert_eq!(parsed.dec_datablocks()[0].data.as_slice(), b"on disk");
}
