//! The `.enc` container format.
//!
//! A container file is a self-describing binary blob: two 64-bit
//! big-endian size prefixes, the header body (modes, chainhash
//! parameters, password validator, encrypted master salt, payload-layer
//! datablocks) and then the ciphertext, one byte per plaintext byte.
//! [`header`] implements the header codec.

pub mod header;

pub use header::{DataHeader, DecDatablock};
