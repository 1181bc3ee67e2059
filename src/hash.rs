//! Hash primitives for the container.
//!
//! A [`HashMode`] selects one of three SHA-2 variants and is persisted as a
//! single byte in the file header. The digest size doubles as the cipher
//! block size, so everything downstream (salts, blocks, the validator) is
//! sized by [`HashMode::hash_size`].

use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::bytes::Bytes;
use crate::error::{Error, ErrorKind};
use crate::settings::STANDARD_HASHMODE;
use crate::Result;

/// Hash function selector, persisted in the header as a one-byte tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashMode {
    /// SHA-256, 32-byte digests (tag 1).
    Sha256 = 1,
    /// SHA-384, 48-byte digests (tag 2).
    Sha384 = 2,
    /// SHA-512, 64-byte digests (tag 3).
    Sha512 = 3,
}

impl HashMode {
    /// Parses the one-byte tag used in the file format.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::HashModeInvalid`] for tags outside 1..=3.
    pub fn from_u8(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Self::Sha256),
            2 => Ok(Self::Sha384),
            3 => Ok(Self::Sha512),
            _ => Err(Error::ctx(ErrorKind::HashModeInvalid, format!("hash mode {tag}"))),
        }
    }

    /// Returns the one-byte tag used in the file format.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The default hash mode for new headers.
    pub fn standard() -> Self {
        Self::from_u8(STANDARD_HASHMODE).expect("standard hash mode is valid")
    }

    /// Returns the digest size in bytes.
    pub fn hash_size(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Hashes a byte sequence. Pure and side-effect free; string inputs
    /// hash as their UTF-8 bytes and agree with this function.
    pub fn hash(self, data: &[u8]) -> Bytes {
        self.hash_concat(&[data])
    }

    /// Hashes the concatenation of several byte sequences without
    /// materializing the concatenation.
    pub fn hash_concat(self, parts: &[&[u8]]) -> Bytes {
        fn run<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
            let mut digest = D::new();
            for part in parts {
                digest.update(part);
            }
            digest.finalize().to_vec()
        }
        let out = match self {
            Self::Sha256 => run::<Sha256>(parts),
            Self::Sha384 => run::<Sha384>(parts),
            Self::Sha512 => run::<Sha512>(parts),
        };
        Bytes::from_slice(&out)
    }
}
