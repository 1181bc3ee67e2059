//! End-to-end workflow scenarios through the API state machine.

mod common;

use encvault::{
    Api, ApiState, Bytes, ChainHashMode, ErrorKind, FileDataStruct, HashMode,
    HeaderSettingsIters, Password, Timed,
};
use tempfile::tempdir;

fn settings(
    hash_mode: HashMode,
    ch1: (ChainHashMode, u64),
    ch2: (ChainHashMode, u64),
) -> HeaderSettingsIters {
    HeaderSettingsIters {
        file_mode: 1,
        hash_mode,
        chainhash1_mode: ch1.0,
        chainhash1_iters: ch1.1,
        chainhash2_mode: ch2.0,
        chainhash2_iters: ch2.1,
    }
}

/// SHA-256, NORMAL/NORMAL at 1000 iterations, empty payload: the file
/// is exactly the 102-byte header.
#[test]
fn empty_payload_produces_minimum_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.enc");
    let password = Password::new("Password");

    let mut api = Api::new(1).unwrap();
    api.create_file(&path).unwrap();
    api.select_file(&path).unwrap();
    api.create_data_header(
        &password,
        &settings(
            HashMode::Sha256,
            (ChainHashMode::Normal, 1000),
            (ChainHashMode::Normal, 1000),
        ),
        0,
    )
    .unwrap();
    api.get_encrypted_data(&FileDataStruct::new(1, Bytes::new(0)).unwrap())
        .unwrap();
    api.write_to_file().unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().len(), 16 + 22 + 2 * 32);

    // re-read, verify, decrypt: zero-byte payload
    api.logout();
    api.select_file(&path).unwrap();
    assert!(!api.verify_password(&password, 0).unwrap().is_timed_out());
    let decrypted = api.get_decrypted_data().unwrap();
    assert_eq!(decrypted.data.len(), 0);
}

/// One mebibyte of random payload through CONSTANT_COUNT_SALT and
/// QUADRATIC chainhashes at a million iterations each.
#[test]
fn megabyte_round_trip_with_heavy_chainhashes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("heavy.enc");
    let password = Password::new("password");

    let payload = {
        use rand::RngCore;
        let mut buf = vec![0u8; 1 << 20];
        rand::thread_rng().fill_bytes(&mut buf);
        buf
    };

    let mut api = Api::new(1).unwrap();
    api.create_file(&path).unwrap();
    api.select_file(&path).unwrap();
    api.create_data_header(
        &password,
        &settings(
            HashMode::Sha256,
            (ChainHashMode::ConstantCountSalt, 1_000_000),
            (ChainHashMode::Quadratic, 1_000_000),
        ),
        0,
    )
    .unwrap();
    api.get_encrypted_data(&FileDataStruct::new(1, Bytes::from_slice(&payload)).unwrap())
        .unwrap();
    api.write_to_file().unwrap();

    assert!(std::fs::metadata(&path).unwrap().len() > payload.len() as u64);

    api.logout();
    api.select_file(&path).unwrap();
    assert!(!api.verify_password(&password, 0).unwrap().is_timed_out());
    let decrypted = api.get_decrypted_data().unwrap();
    assert_eq!(decrypted.data.as_slice(), &payload[..]);
}

/// Wrong password fails with `PasswordInvalid` and the state stays
/// `FILE_SELECTED`.
#[test]
fn wrong_password_rejected() {
    let dir = tempdir().unwrap();
    let (mut api, path) = common::fresh_decrypted_api(dir.path(), "wrongpw.enc");
    api.get_encrypted_data(&FileDataStruct::new(1, Bytes::from_slice(b"data")).unwrap())
        .unwrap();
    api.write_to_file().unwrap();

    api.logout();
    api.select_file(&path).unwrap();
    // built with "Password", verified with "password"
    let err = api.verify_password(&Password::new("password"), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PasswordInvalid);
    assert_eq!(api.state(), ApiState::FileSelected);
}

/// A 1 ms budget against a billion SHA-512 iterations returns TIMEOUT
/// and does not advance the state.
#[test]
fn verify_timeout_preserves_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slow.enc");
    let password = Password::new("Password");

    let mut api = Api::new(1).unwrap();
    api.create_file(&path).unwrap();
    api.select_file(&path).unwrap();
    // building the header runs the chainhashes once, give it no budget
    api.create_data_header(
        &password,
        &settings(
            HashMode::Sha512,
            (ChainHashMode::Normal, 1_000_000_000),
            (ChainHashMode::Normal, 1),
        ),
        1,
    )
    .map(|outcome| assert!(outcome.is_timed_out()))
    .unwrap();
    assert_eq!(api.state(), ApiState::FileSelected);

    // build a cheap header instead, then tamper the iteration count up
    api.create_data_header(
        &password,
        &settings(
            HashMode::Sha512,
            (ChainHashMode::Normal, 1),
            (ChainHashMode::Normal, 1),
        ),
        0,
    )
    .unwrap();
    api.get_encrypted_data(&FileDataStruct::new(1, Bytes::new(0)).unwrap())
        .unwrap();
    api.write_to_file().unwrap();

    // raise chainhash1 iterations to one billion directly in the file
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[19..27].copy_from_slice(&1_000_000_000u64.to_be_bytes());
    std::fs::write(&path, &bytes).unwrap();

    api.logout();
    api.select_file(&path).unwrap();
    let outcome = api.verify_password(&password, 1).unwrap();
    assert_eq!(outcome, Timed::TimedOut);
    assert_eq!(api.state(), ApiState::FileSelected);
}

/// Every operation outside its state returns `ApiStateInvalid` with the
/// method name and mutates nothing.
#[test]
fn illegal_calls_rejected_in_every_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("states.enc");
    let password = Password::new("Password");
    let mut api = Api::new(1).unwrap();

    // INIT
    for (result, method) in [
        (api.is_file_empty().map(|_| ()), "is_file_empty"),
        (api.unselect_file(), "unselect_file"),
        (api.delete_file(), "delete_file"),
        (api.get_file_content().map(|_| ()), "get_file_content"),
        (api.verify_password(&password, 0).map(|_| ()), "verify_password"),
        (api.get_decrypted_data().map(|_| ()), "get_decrypted_data"),
        (api.get_file_data().map(|_| ()), "get_file_data"),
        (api.change_salt(), "change_salt"),
        (api.write_to_file(), "write_to_file"),
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ApiStateInvalid, "{method} in INIT");
        assert_eq!(err.context(), Some(method));
        assert_eq!(api.state(), ApiState::Init);
    }

    // FILE_SELECTED
    api.create_file(&path).unwrap();
    api.select_file(&path).unwrap();
    for (result, method) in [
        (api.select_file(&path), "select_file"),
        (api.get_decrypted_data().map(|_| ()), "get_decrypted_data"),
        (api.get_file_data().map(|_| ()), "get_file_data"),
        (api.change_salt(), "change_salt"),
        (api.write_to_file(), "write_to_file"),
    ] {
        let err = result.unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::ApiStateInvalid,
            "{method} in FILE_SELECTED"
        );
        assert_eq!(api.state(), ApiState::FileSelected);
    }

    // DECRYPTED
    api.create_data_header(
        &password,
        &settings(
            HashMode::Sha256,
            (ChainHashMode::Normal, 50),
            (ChainHashMode::Normal, 50),
        ),
        0,
    )
    .unwrap();
    for (result, method) in [
        (api.verify_password(&password, 0).map(|_| ()), "verify_password"),
        (api.get_decrypted_data().map(|_| ()), "get_decrypted_data"),
        (api.write_to_file(), "write_to_file"),
        (api.unselect_file(), "unselect_file"),
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ApiStateInvalid, "{method} in DECRYPTED");
        assert_eq!(api.state(), ApiState::Decrypted);
    }

    // ENCRYPTED
    api.get_encrypted_data(&FileDataStruct::new(1, Bytes::from_slice(b"x")).unwrap())
        .unwrap();
    for (result, method) in [
        (api.get_file_data().map(|_| ()), "get_file_data"),
        (api.change_salt(), "change_salt"),
        (api.verify_password(&password, 0).map(|_| ()), "verify_password"),
        (
            api.get_encrypted_data(&FileDataStruct::new(1, Bytes::new(0)).unwrap())
                .map(|_| ()),
            "get_encrypted_data",
        ),
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ApiStateInvalid, "{method} in ENCRYPTED");
        assert_eq!(api.state(), ApiState::Encrypted);
    }
}

/// The password validator property: verification succeeds exactly when
/// `chainhash2(chainhash1(pw))` equals the stored validator.
#[test]
fn validator_round_trip_all_hash_modes() {
    for hash_mode in [HashMode::Sha256, HashMode::Sha384, HashMode::Sha512] {
        let dir = tempdir().unwrap();
        let path = dir.path().join("validator.enc");
        let password = Password::new("Password");

        let mut api = Api::new(1).unwrap();
        api.create_file(&path).unwrap();
        api.select_file(&path).unwrap();
        api.create_data_header(
            &password,
            &settings(
                hash_mode,
                (ChainHashMode::ConstantSalt, 200),
                (ChainHashMode::CountSalt, 200),
            ),
            0,
        )
        .unwrap();
        api.get_encrypted_data(&FileDataStruct::new(1, Bytes::new(0)).unwrap())
            .unwrap();
        api.write_to_file().unwrap();
        api.logout();

        api.select_file(&path).unwrap();
        assert!(!api.verify_password(&password, 0).unwrap().is_timed_out());
        api.logout();

        api.select_file(&path).unwrap();
        assert!(api
            .verify_password(&Password::new("Passwords"), 0)
            .is_err());
        api.logout();
    }
}

/// change_salt produces a different enc_salt but the same plaintext
/// after a full write/read cycle.
#[test]
fn change_salt_keeps_payload_readable() {
    let dir = tempdir().unwrap();
    let (mut api, path) = common::fresh_decrypted_api(dir.path(), "resalt.enc");
    let payload = FileDataStruct::new(1, Bytes::from_slice(b"stable payload")).unwrap();
    let first_cipher = api.get_encrypted_data(&payload).unwrap();
    api.write_to_file().unwrap();

    // back to DECRYPTED via a fresh verify cycle
    api.logout();
    api.select_file(&path).unwrap();
    api.verify_password(&Password::new(common::PASSWORD), 0).unwrap();
    api.get_decrypted_data().unwrap();

    api.change_salt().unwrap();
    let second_cipher = api.get_encrypted_data(&payload).unwrap();
    // same plaintext, new salt: ciphertext almost surely differs
    assert_ne!(first_cipher, second_cipher);
    api.write_to_file().unwrap();

    api.logout();
    api.select_file(&path).unwrap();
    api.verify_password(&Password::new(common::PASSWORD), 0).unwrap();
    assert_eq!(
        api.get_decrypted_data().unwrap().data.as_slice(),
        b"stable payload"
    );
}

/// Writing to a second path leaves a byte-identical readable container.
#[test]
fn write_to_other_path() {
    let dir = tempdir().unwrap();
    let (mut api, path) = common::fresh_decrypted_api(dir.path(), "origin.enc");
    api.get_encrypted_data(&FileDataStruct::new(1, Bytes::from_slice(b"copy me")).unwrap())
        .unwrap();
    api.write_to_file().unwrap();
    let copy = dir.path().join("copy.enc");
    api.write_to_file_path(&copy).unwrap();

    assert_eq!(
        std::fs::read(&path).unwrap(),
        std::fs::read(&copy).unwrap()
    );

    api.logout();
    api.select_file(&copy).unwrap();
    api.verify_password(&Password::new(common::PASSWORD), 0).unwrap();
    assert_eq!(api.get_decrypted_data().unwrap().data.as_slice(), b"copy me");
}

/// Directory listing returns empty containers and containers with a
/// matching header, and skips everything else.
#[test]
fn relevant_file_names() {
    let dir = tempdir().unwrap();

    // an empty container, a written container, a foreign file and a
    // non-container payload
    let (mut api, _) = common::fresh_decrypted_api(dir.path(), "written.enc");
    api.get_encrypted_data(&FileDataStruct::new(1, Bytes::from_slice(b"p")).unwrap())
        .unwrap();
    api.write_to_file().unwrap();
    api.logout();

    api.create_file(dir.path().join("empty.enc")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"notes").unwrap();
    std::fs::write(dir.path().join("junk.enc"), b"junk bytes, no header").unwrap();

    let names = api.get_relevant_file_names(dir.path()).unwrap();
    assert_eq!(names, vec!["empty.enc".to_string(), "written.enc".to_string()]);
}

/// Password policy violations are rejected before any chainhash work.
#[test]
fn password_policy_enforced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("policy.enc");
    let mut api = Api::new(1).unwrap();
    api.create_file(&path).unwrap();
    api.select_file(&path).unwrap();

    let err = api
        .verify_password(&Password::new("short"), 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PasswordTooShort);

    let err = api
        .verify_password(&Password::new("has spaces!"), 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PasswordCharInvalid);
    assert_eq!(api.state(), ApiState::FileSelected);
}
