//! Fixed-size cipher blocks.
//!
//! A block is one `hash_size`-long unit of the payload with its own salt.
//! The encrypt variant takes plaintext and emits `plaintext + salt`
//! (mod 256 per byte); the decrypt variant takes ciphertext and emits
//! `ciphertext - salt`. When a block fills up it computes the hash of its
//! plaintext exactly once; that hash feeds the salt iterator for the
//! next block.

use crate::bytes::Bytes;
use crate::error::{Error, ErrorKind};
use crate::hash::HashMode;
use crate::Result;

/// Shared behavior of encrypt and decrypt blocks.
pub trait CipherBlock: Sized {
    /// Creates a block for the given hash function and block salt.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if the salt length does not equal the
    /// hash size (which is the block length).
    fn new(hash: HashMode, salt: Bytes) -> Result<Self>;

    /// Returns the block length in bytes (equal to the hash size).
    fn block_len(&self) -> usize;

    /// Returns how many bytes can still be added.
    fn free_space(&self) -> usize;

    /// Adds input bytes to the block, transforming them with the salt.
    ///
    /// Adding an empty slice is a no-op; on an already full block it is
    /// tolerated but logged. Adding more bytes than [`free_space`]
    /// (including any non-empty add to a full block) fails loudly.
    ///
    /// [`free_space`]: Self::free_space
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if the data does not fit.
    fn add_data(&mut self, data: &[u8]) -> Result<()>;

    /// Returns the output bytes produced so far: ciphertext for the
    /// encrypt variant, plaintext for the decrypt variant. For a partial
    /// block this is exactly `block_len - free_space` bytes.
    fn result(&self) -> Bytes;

    /// Returns the hash of the block's plaintext.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if the block is not complete yet.
    fn hash(&self) -> Result<Bytes>;
}

fn check_salt(hash: HashMode, salt: &Bytes) -> Result<()> {
    if salt.len() != hash.hash_size() {
        return Err(Error::ctx(
            ErrorKind::LengthInvalid,
            format!(
                "block salt must match the block length (salt: {}, block: {})",
                salt.len(),
                hash.hash_size()
            ),
        ));
    }
    Ok(())
}

fn check_fit(free: usize, incoming: usize, block_len: usize) -> Result<bool> {
    if incoming == 0 {
        if free == 0 {
            // tolerated, the block hash is already fixed
            log::warn!("added empty data to a completed block (block_len: {block_len})");
        }
        return Ok(false);
    }
    if incoming > free {
        return Err(Error::ctx(
            ErrorKind::LengthInvalid,
            format!("data does not fit into the block (free: {free}, got: {incoming})"),
        ));
    }
    Ok(true)
}

fn completed_hash(dec_hash: &Option<Bytes>, free: usize) -> Result<Bytes> {
    if free != 0 {
        return Err(Error::ctx(
            ErrorKind::LengthInvalid,
            "block is not completed, cannot get hash",
        ));
    }
    dec_hash
        .clone()
        .ok_or_else(|| Error::ctx(ErrorKind::Bug, "block hash was not calculated"))
}

/// A block that encrypts plaintext.
///
/// Stores the plaintext as it arrives; the ciphertext is derived on
/// demand by adding the salt.
#[derive(Debug)]
pub struct EncryptBlock {
    data: Bytes,
    salt: Bytes,
    dec_hash: Option<Bytes>,
    hash: HashMode,
}

impl CipherBlock for EncryptBlock {
    fn new(hash: HashMode, salt: Bytes) -> Result<Self> {
        check_salt(hash, &salt)?;
        Ok(Self {
            data: Bytes::new(hash.hash_size()),
            salt,
            dec_hash: None,
            hash,
        })
    }

    fn block_len(&self) -> usize {
        self.data.max_len()
    }

    fn free_space(&self) -> usize {
        self.block_len() - self.data.len()
    }

    fn add_data(&mut self, data: &[u8]) -> Result<()> {
        if !check_fit(self.free_space(), data.len(), self.block_len())? {
            return Ok(());
        }
        self.data.add_consume(data)?;
        if self.free_space() == 0 && self.dec_hash.is_none() {
            self.dec_hash = Some(self.hash.hash(self.data.as_slice()));
        }
        Ok(())
    }

    fn result(&self) -> Bytes {
        let salt = self
            .salt
            .copy_sub(0, self.data.len())
            .expect("salt covers the block");
        self.data.try_add(&salt).expect("equal lengths")
    }

    fn hash(&self) -> Result<Bytes> {
        completed_hash(&self.dec_hash, self.free_space())
    }
}

/// A block that decrypts ciphertext.
///
/// Stores ciphertext while filling; on completion the contents are
/// replaced by the plaintext and its hash is recorded.
#[derive(Debug)]
pub struct DecryptBlock {
    data: Bytes,
    salt: Bytes,
    dec_hash: Option<Bytes>,
    hash: HashMode,
}

impl CipherBlock for DecryptBlock {
    fn new(hash: HashMode, salt: Bytes) -> Result<Self> {
        check_salt(hash, &salt)?;
        Ok(Self {
            data: Bytes::new(hash.hash_size()),
            salt,
            dec_hash: None,
            hash,
        })
    }

    fn block_len(&self) -> usize {
        self.data.max_len()
    }

    fn free_space(&self) -> usize {
        self.block_len() - self.data.len()
    }

    fn add_data(&mut self, data: &[u8]) -> Result<()> {
        if !check_fit(self.free_space(), data.len(), self.block_len())? {
            return Ok(());
        }
        self.data.add_consume(data)?;
        if self.free_space() == 0 && self.dec_hash.is_none() {
            self.data = self.data.try_sub(&self.salt)?;
            self.dec_hash = Some(self.hash.hash(self.data.as_slice()));
        }
        Ok(())
    }

    fn result(&self) -> Bytes {
        if self.free_space() == 0 {
            // already decrypted in place
            return self.data.clone();
        }
        let salt = self
            .salt
            .copy_sub(0, self.data.len())
            .expect("salt covers the block");
        self.data.try_sub(&salt).expect("equal lengths")
    }

    fn hash(&self) -> Result<Bytes> {
        completed_hash(&self.dec_hash, self.free_space())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salt(hash: HashMode, seed: u8) -> Bytes {
        Bytes::from_slice(&vec![seed; hash.hash_size()])
    }

    #[test]
    fn test_salt_length_checked() {
        let err = EncryptBlock::new(HashMode::Sha256, Bytes::from_slice(&[1; 31])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthInvalid);
        assert!(DecryptBlock::new(HashMode::Sha256, Bytes::from_slice(&[1; 32])).is_ok());
    }

    #[test]
    fn test_encrypt_adds_salt() {
        let hash = HashMode::Sha256;
        let mut block = EncryptBlock::new(hash, salt(hash, 1)).unwrap();
        block.add_data(&[10, 20, 255]).unwrap();
        assert_eq!(block.result().as_slice(), &[11, 21, 0]);
        assert_eq!(block.free_space(), 29);
    }

    #[test]
    fn test_block_round_trip() {
        let hash = HashMode::Sha256;
        let plain = Bytes::random(hash.hash_size()).unwrap();
        let block_salt = Bytes::random(hash.hash_size()).unwrap();

        let mut enc = EncryptBlock::new(hash, block_salt.clone()).unwrap();
        enc.add_data(plain.as_slice()).unwrap();
        let cipher = enc.result();

        let mut dec = DecryptBlock::new(hash, block_salt).unwrap();
        dec.add_data(cipher.as_slice()).unwrap();
        assert_eq!(dec.result(), plain);
        // both sides agree on the plaintext hash
        assert_eq!(enc.hash().unwrap(), dec.hash().unwrap());
        assert_eq!(dec.hash().unwrap(), hash.hash(plain.as_slice()));
    }

    #[test]
    fn test_partial_round_trip() {
        let hash = HashMode::Sha256;
        let block_salt = salt(hash, 7);
        let mut enc = EncryptBlock::new(hash, block_salt.clone()).unwrap();
        enc.add_data(b"abc").unwrap();
        let cipher = enc.result();
        assert_eq!(cipher.len(), 3);

        let mut dec = DecryptBlock::new(hash, block_salt).unwrap();
        dec.add_data(cipher.as_slice()).unwrap();
        assert_eq!(dec.result().as_slice(), b"abc");
    }

    #[test]
    fn test_over_add_fails_loudly() {
        let hash = HashMode::Sha256;
        let mut block = EncryptBlock::new(hash, salt(hash, 0)).unwrap();
        block.add_data(&[0; 30]).unwrap();
        let err = block.add_data(&[0; 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthInvalid);
        // the failed add left the block untouched
        assert_eq!(block.free_space(), 2);
    }

    #[test]
    fn test_empty_add_is_noop() {
        let hash = HashMode::Sha256;
        let mut block = DecryptBlock::new(hash, salt(hash, 3)).unwrap();
        block.add_data(&[]).unwrap();
        assert_eq!(block.free_space(), 32);

        block.add_data(&[9; 32]).unwrap();
        let hash_before = block.hash().unwrap();
        // tolerated on a full block, hash stays fixed
        block.add_data(&[]).unwrap();
        assert_eq!(block.hash().unwrap(), hash_before);
        // a non-empty add to a full block still fails
        assert!(block.add_data(&[1]).is_err());
    }

    #[test]
    fn test_hash_before_completion_fails() {
        let hash = HashMode::Sha512;
        let mut block = EncryptBlock::new(hash, salt(hash, 2)).unwrap();
        block.add_data(&[1; 63]).unwrap();
        assert_eq!(block.hash().unwrap_err().kind(), ErrorKind::LengthInvalid);
        block.add_data(&[1]).unwrap();
        assert_eq!(block.hash().unwrap().len(), hash.hash_size());
    }

    #[test]
    fn test_incremental_adds_match_single_add() {
        let hash = HashMode::Sha256;
        let plain: Vec<u8> = (0..32).collect();

        let mut whole = EncryptBlock::new(hash, salt(hash, 9)).unwrap();
        whole.add_data(&plain).unwrap();

        let mut pieces = EncryptBlock::new(hash, salt(hash, 9)).unwrap();
        pieces.add_data(&plain[..10]).unwrap();
        pieces.add_data(&plain[10..30]).unwrap();
        pieces.add_data(&plain[30..]).unwrap();

        assert_eq!(whole.result(), pieces.result());
        assert_eq!(whole.hash().unwrap(), pieces.hash().unwrap());
    }
}
