//! Per-block salt generation.

use crate::bytes::Bytes;
use crate::error::{Error, ErrorKind};
use crate::hash::HashMode;
use crate::Result;

/// Deterministic generator of per-block salts.
///
/// Initialized with the password hash and the *encrypted* master salt
/// (not the raw salt; using the raw salt breaks file compatibility).
/// Every block advances the internal chain with the previous block's
/// plaintext hash:
///
/// ```text
/// current_hash := pwhash
/// current_salt := H(pwhash ++ enc_salt)
/// next(lbh):
///     current_hash := H(current_hash ++ current_salt ++ lbh)
///     return H(current_hash ++ current_salt)
/// ```
///
/// For the very first block `lbh` is an all-zero buffer of hash size.
/// The returned salt is a hash over the internal state, so observing
/// salts alone does not reveal the password hash or any prior state
/// without inverting `H`.
#[derive(Debug)]
pub struct SaltIterator {
    hash: HashMode,
    current_hash: Bytes,
    current_salt: Bytes,
    first: bool,
}

impl SaltIterator {
    /// Initializes the iterator.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] unless both `pwhash` and `enc_salt`
    /// are exactly `hash.hash_size()` bytes.
    pub fn new(pwhash: &Bytes, enc_salt: &Bytes, hash: HashMode) -> Result<Self> {
        if pwhash.len() != hash.hash_size() {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!(
                    "password hash must match the hash size (len: {}, hash size: {})",
                    pwhash.len(),
                    hash.hash_size()
                ),
            ));
        }
        if enc_salt.len() != hash.hash_size() {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!(
                    "encrypted salt must match the hash size (len: {}, hash size: {})",
                    enc_salt.len(),
                    hash.hash_size()
                ),
            ));
        }
        Ok(Self {
            hash,
            current_hash: pwhash.clone(),
            current_salt: hash.hash_concat(&[pwhash.as_slice(), enc_salt.as_slice()]),
            first: true,
        })
    }

    /// Returns the hash function driving the chain.
    pub fn hash(&self) -> HashMode {
        self.hash
    }

    /// Produces the next block salt.
    ///
    /// The first call ignores `last_block_hash` and uses an all-zero
    /// buffer instead; every later call requires the previous block's
    /// plaintext hash.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if `last_block_hash` is missing or of
    /// the wrong size on a non-first call.
    pub fn next(&mut self, last_block_hash: Option<&Bytes>) -> Result<Bytes> {
        let zero;
        let lbh = if self.first {
            self.first = false;
            zero = Bytes::from_slice(&vec![0u8; self.hash.hash_size()]);
            &zero
        } else {
            let lbh = last_block_hash.ok_or_else(|| {
                Error::ctx(ErrorKind::LengthInvalid, "missing last block hash")
            })?;
            if lbh.len() != self.hash.hash_size() {
                return Err(Error::ctx(
                    ErrorKind::LengthInvalid,
                    format!(
                        "last block hash must match the hash size (len: {}, hash size: {})",
                        lbh.len(),
                        self.hash.hash_size()
                    ),
                ));
            }
            lbh
        };
        self.current_hash = self.hash.hash_concat(&[
            self.current_hash.as_slice(),
            self.current_salt.as_slice(),
            lbh.as_slice(),
        ]);
        Ok(self
            .hash
            .hash_concat(&[self.current_hash.as_slice(), self.current_salt.as_slice()]))
    }
}
