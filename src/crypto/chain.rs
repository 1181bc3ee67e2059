//! In-memory block chains.
//!
//! A [`BlockChain`] streams a payload through a sequence of cipher
//! blocks, owning at most one live block at a time. Each completed
//! block's plaintext hash advances the [`SaltIterator`], so a block's
//! salt depends on everything decrypted before it: rearranging
//! ciphertext blocks breaks the chain even under known plaintext.
//!
//! No padding is used: the output length always equals the input length,
//! and the final block may stay partially filled.

use crate::bytes::Bytes;
use crate::crypto::block::{CipherBlock, DecryptBlock, EncryptBlock};
use crate::crypto::salt_iter::SaltIterator;
use crate::hash::HashMode;
use crate::Result;

/// A streaming chain of cipher blocks accumulating its output in memory.
///
/// The variant is chosen through the block type: [`EncryptBlockChain`]
/// consumes plaintext and accumulates ciphertext,
/// [`DecryptBlockChain`] the reverse.
#[derive(Debug)]
pub struct BlockChain<B: CipherBlock> {
    hash: HashMode,
    salt_iter: SaltIterator,
    current: Option<B>,
    height: u64,
    result: Vec<u8>,
}

/// Chain variant that encrypts.
pub type EncryptBlockChain = BlockChain<EncryptBlock>;
/// Chain variant that decrypts.
pub type DecryptBlockChain = BlockChain<DecryptBlock>;

impl<B: CipherBlock> BlockChain<B> {
    /// Creates an empty chain keyed by the password hash and the
    /// encrypted master salt.
    ///
    /// # Errors
    ///
    /// [`crate::ErrorKind::LengthInvalid`] if either key part does not
    /// match the hash size.
    pub fn new(hash: HashMode, pwhash: &Bytes, enc_salt: &Bytes) -> Result<Self> {
        Ok(Self {
            hash,
            salt_iter: SaltIterator::new(pwhash, enc_salt, hash)?,
            current: None,
            height: 0,
            result: Vec::new(),
        })
    }

    /// Returns the number of blocks started so far.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Returns the number of payload bytes consumed so far.
    pub fn data_size(&self) -> u64 {
        let free = self
            .current
            .as_ref()
            .map(|b| b.free_space() as u64)
            .unwrap_or(0);
        self.height * self.hash.hash_size() as u64 - free
    }

    /// Adds payload bytes, rolling blocks as they fill.
    ///
    /// Bytes are consumed strictly in input order and emitted in the same
    /// order; the salt iterator advances exactly once per block boundary.
    pub fn add_data(&mut self, data: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < data.len() {
            if self.needs_block() {
                self.roll_block()?;
            }
            let block = self.current.as_mut().expect("block was just ensured");
            let chunk = block.free_space().min(data.len() - written);
            block.add_data(&data[written..written + chunk])?;
            written += chunk;
        }
        log::trace!(
            "added {written}B to blockchain (height: {}, data size: {}B)",
            self.height,
            self.data_size()
        );
        Ok(())
    }

    /// Flushes the partial last block and returns the accumulated output.
    ///
    /// The payload is not padded: the output length equals the number of
    /// input bytes added.
    pub fn result(mut self) -> Bytes {
        if let Some(block) = self.current.take() {
            self.result.extend_from_slice(block.result().as_slice());
        }
        log::debug!(
            "moving blockchain result (height: {}, {}B)",
            self.height,
            self.result.len()
        );
        Bytes::from_slice(&self.result)
    }

    fn needs_block(&self) -> bool {
        self.current.as_ref().map(|b| b.free_space() == 0).unwrap_or(true)
    }

    fn roll_block(&mut self) -> Result<()> {
        let next_salt = match &self.current {
            Some(block) => self.salt_iter.next(Some(&block.hash()?))?,
            None => self.salt_iter.next(None)?,
        };
        if let Some(block) = self.current.take() {
            self.result.extend_from_slice(block.result().as_slice());
        }
        self.current = Some(B::new(self.hash, next_salt)?);
        self.height += 1;
        Ok(())
    }
}
