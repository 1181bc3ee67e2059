//! The cryptographic pipeline of the container.
//!
//! Encryption is a block-oriented mod-256 stream cipher keyed by a hash
//! chain:
//!
//! 1. The password is stretched into a password hash (chainhash 1) and a
//!    validator (chainhash 2), see [`crate::chainhash`].
//! 2. A [`SaltIterator`] derives one salt per block from the password
//!    hash and the encrypted master salt, binding each block's salt to
//!    the previous block's plaintext hash.
//! 3. Payload bytes flow through a [`BlockChain`] (in memory) or
//!    [`BlockChainStream`] (reader to writer), added to or subtracted
//!    from the salts byte by byte.
//!
//! The scheme is deliberately not AEAD: integrity is limited to the
//! password validator stored in the header.

mod block;
mod chain;
mod password;
mod salt_iter;
mod stream;

pub use block::{CipherBlock, DecryptBlock, EncryptBlock};
pub use chain::{BlockChain, DecryptBlockChain, EncryptBlockChain};
pub use password::Password;
pub use salt_iter::SaltIterator;
pub use stream::{BlockChainStream, DecryptBlockChainStream, EncryptBlockChainStream};
