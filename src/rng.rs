//! Cryptographically strong randomness.
//!
//! All random material in the container (master salts, generated chainhash
//! parameters) comes through this module. A failing entropy source is a
//! fatal condition and is propagated to the caller rather than papered
//! over.

use crate::error::{Error, ErrorKind};
use crate::Result;

/// Fills `buf` with cryptographically strong random bytes.
///
/// # Errors
///
/// Returns [`ErrorKind::Bug`] if the operating system RNG fails; there is
/// no meaningful recovery from that and callers are expected to abort the
/// current operation.
pub fn fill(buf: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buf).map_err(|e| {
        log::error!("system RNG failed: {e}");
        Error::ctx(ErrorKind::Bug, format!("system RNG failed: {e}"))
    })
}

/// Returns `len` cryptographically strong random bytes.
pub fn random_vec(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    fill(&mut buf)?;
    Ok(buf)
}

/// Returns a random `u64`.
pub fn random_u64() -> Result<u64> {
    let mut buf = [0u8; 8];
    fill(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}
