//! # encvault
//!
//! Password-based `.enc` container encryption with chainhash key
//! stretching.
//!
//! A container file is self-describing: its header records the hash
//! primitive, the two chainhash configurations, a password validator and
//! the encrypted master salt. The payload is enciphered by a
//! block-oriented mod-256 stream keyed by a hash chain, so arbitrary
//! payload sizes stream through bounded memory: one byte of ciphertext
//! per byte of plaintext, no padding.
//!
//! ## Quick Start
//!
//! Creating an encrypted container and reading it back:
//!
//! ```rust,no_run
//! use encvault::{
//!     Api, Bytes, FileDataStruct, HeaderSettingsIters, Password, Result,
//! };
//!
//! fn main() -> Result<()> {
//!     let password = Password::new("Password1");
//!
//!     // encrypt
//!     let mut api = Api::new(1)?;
//!     api.create_file("vault.enc")?;
//!     api.select_file("vault.enc")?;
//!     api.create_data_header(&password, &HeaderSettingsIters::default(), 0)?;
//!     let payload = FileDataStruct::new(1, Bytes::from_slice(b"secrets"))?;
//!     api.get_encrypted_data(&payload)?;
//!     api.write_to_file()?;
//!     api.logout();
//!
//!     // decrypt
//!     api.select_file("vault.enc")?;
//!     api.verify_password(&password, 0)?;
//!     let decrypted = api.get_decrypted_data()?;
//!     assert_eq!(decrypted.data.as_slice(), b"secrets");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`bytes`] | Fixed-capacity byte buffer with mod-256 arithmetic |
//! | [`hash`] | SHA-256/384/512 behind a one-byte mode tag |
//! | [`chainhash`] | The five key-stretching functions and their parameter blocks |
//! | [`format`] | The self-describing binary header codec |
//! | [`crypto`] | Salt iterator, cipher blocks, streaming block chains |
//! | [`fs`] | Container file handle and the app-data settings file |
//! | [`api`] | The select → verify → decrypt → edit → encrypt → write state machine |
//! | [`filedata`] | Payload schemas (file mode 1: password records) |
//!
//! ## Security model
//!
//! This is not AEAD. Integrity protection is limited to the password
//! validator (`chainhash2(chainhash1(password))`, stored in the header);
//! the payload cipher is a salt-chained mod-256 stream whose per-block
//! salts depend on the previous block's plaintext hash. Key stretching
//! cost is fully configurable and recorded in the header, up to one
//! billion iterations.

pub mod api;
pub mod bytes;
pub mod chainhash;
pub mod crypto;
pub mod error;
pub mod filedata;
pub mod format;
pub mod fs;
pub mod hash;
pub mod rng;
pub mod settings;

pub use api::{Api, ApiState, HeaderSettingsIters, HeaderSettingsTime};
pub use bytes::Bytes;
pub use chainhash::{ChainHash, ChainHashData, ChainHashMode, Format};
pub use crypto::{
    BlockChain, BlockChainStream, CipherBlock, DecryptBlock, DecryptBlockChain,
    DecryptBlockChainStream, EncryptBlock, EncryptBlockChain, EncryptBlockChainStream, Password,
    SaltIterator,
};
pub use error::{Error, ErrorKind, Result, Timed};
pub use filedata::{FileDataStruct, PasswordData, PasswordRecord};
pub use format::{DataHeader, DecDatablock};
pub use fs::{AppSettings, FileHandle};
pub use hash::HashMode;
