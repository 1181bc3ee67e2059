//! Reader-to-writer block chains.
//!
//! [`BlockChainStream`] follows the same block protocol as
//! [`BlockChain`](crate::crypto::BlockChain) but never holds more than
//! one block of payload in memory: input bytes are pulled from an
//! `io::Read`, transformed, and pushed to an `io::Write` block by block.
//! The number of bytes written always equals the number of bytes read;
//! the output for the final, partially filled block is exactly its fill
//! level.

use std::io::{Read, Write};

use crate::bytes::Bytes;
use crate::crypto::block::{CipherBlock, DecryptBlock, EncryptBlock};
use crate::crypto::salt_iter::SaltIterator;
use crate::error::{Error, ErrorKind};
use crate::hash::HashMode;
use crate::Result;

/// A block chain that streams between a reader and a writer.
#[derive(Debug)]
pub struct BlockChainStream<B: CipherBlock> {
    hash: HashMode,
    salt_iter: SaltIterator,
    current: Option<B>,
    height: u64,
}

/// Stream variant that encrypts.
pub type EncryptBlockChainStream = BlockChainStream<EncryptBlock>;
/// Stream variant that decrypts.
pub type DecryptBlockChainStream = BlockChainStream<DecryptBlock>;

impl<B: CipherBlock> BlockChainStream<B> {
    /// Creates an empty stream chain keyed by the password hash and the
    /// encrypted master salt.
    pub fn new(hash: HashMode, pwhash: &Bytes, enc_salt: &Bytes) -> Result<Self> {
        Ok(Self {
            hash,
            salt_iter: SaltIterator::new(pwhash, enc_salt, hash)?,
            current: None,
            height: 0,
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

    /// Streams `input` to exhaustion, writing the transformed bytes to
    /// `output`. Returns the number of bytes processed.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileRead`] on I/O failure; the chain state must be
    /// discarded afterwards.
    pub fn process<R: Read, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<u64> {
        let mut total = 0u64;
        let mut buf = vec![0u8; self.hash.hash_size()];
        loop {
            if self.needs_block() {
                self.roll_block()?;
            }
            let block = self.current.as_mut().expect("block was just ensured");
            let written_in_block = block.block_len() - block.free_space();
            let wanted = block.free_space();
            let got = read_up_to(input, &mut buf[..wanted])?;
            if got == 0 {
                break;
            }
            block.add_data(&buf[..got])?;

            // emit only the bytes this call produced, earlier output of
            // the same block is already on the wire
            let out = block.result();
            output
                .write_all(&out.as_slice()[written_in_block..written_in_block + got])
                .map_err(|e| Error::ctx(ErrorKind::FileRead, e.to_string()))?;
            total += got as u64;

            if got < wanted {
                // input exhausted mid-block
                break;
            }
        }
        output
            .flush()
            .map_err(|e| Error::ctx(ErrorKind::FileRead, e.to_string()))?;
        log::debug!(
            "streamed {total}B through blockchain (height: {}, data size: {}B)",
            self.height,
            self.data_size()
        );
        Ok(total)
    }

    fn needs_block(&self) -> bool {
        self.current.as_ref().map(|b| b.free_space() == 0).unwrap_or(true)
    }

    fn roll_block(&mut self) -> Result<()> {
        let next_salt = match &self.current {
            Some(block) => self.salt_iter.next(Some(&block.hash()?))?,
            None => self.salt_iter.next(None)?,
        };
        self.current = Some(B::new(self.hash, next_salt)?);
        self.height += 1;
        Ok(())
    }
}

/// Reads until `buf` is full or the reader is exhausted.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::ctx(ErrorKind::FileRead, e.to_string())),
        }
    }
    Ok(filled)
}
