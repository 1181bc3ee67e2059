//! Fixed-capacity byte buffer.
//!
//! [`Bytes`] is a bounded, mutable byte sequence: a capacity chosen at
//! construction and a current length that grows up to it. Capacities are
//! derived from the hash size on the streaming paths, so buffers never
//! reallocate while blocks are being filled.
//!
//! The elementwise mod-256 add and subtract are the container's cipher
//! primitive: `ciphertext = plaintext + salt`, `plaintext = ciphertext -
//! salt`, byte by byte.

use zeroize::Zeroize;

use crate::error::{Error, ErrorKind};
use crate::{rng, Result};

/// A bounded mutable byte sequence with capacity `max_len` and current
/// length `len <= max_len`.
#[derive(Clone)]
pub struct Bytes {
    data: Vec<u8>,
    max_len: usize,
}

// equality is over contents; capacity is an allocation detail
impl PartialEq for Bytes {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Bytes {}

impl Bytes {
    /// Creates an empty buffer with the given capacity.
    pub fn new(max_len: usize) -> Self {
        Self {
            data: Vec::with_capacity(max_len),
            max_len,
        }
    }

    /// Creates a buffer of capacity `len` filled with cryptographically
    /// strong random bytes.
    pub fn random(len: usize) -> Result<Self> {
        let mut buf = Self::new(len);
        buf.fill_random()?;
        Ok(buf)
    }

    /// Creates a buffer holding a copy of `src`, with capacity equal to
    /// its length.
    pub fn from_slice(src: &[u8]) -> Self {
        Self {
            data: src.to_vec(),
            max_len: src.len(),
        }
    }

    /// Creates a buffer from the big-endian bytes of `value` with leading
    /// zero bytes omitted. Zero yields an empty buffer.
    pub fn from_long(value: u64) -> Self {
        let be = value.to_be_bytes();
        let first = be.iter().position(|&b| b != 0).unwrap_or(be.len());
        Self::from_slice(&be[first..])
    }

    /// Returns the current length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the capacity in bytes.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Returns `true` if no bytes are set.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the buffer is filled to capacity.
    pub fn is_full(&self) -> bool {
        self.data.len() == self.max_len
    }

    /// Returns the set bytes as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Removes all bytes, keeping the capacity.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Appends one byte.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if the buffer is full.
    pub fn add_byte(&mut self, byte: u8) -> Result<()> {
        if self.is_full() {
            return Err(Error::ctx(ErrorKind::LengthInvalid, "buffer is full"));
        }
        self.data.push(byte);
        Ok(())
    }

    /// Appends `n` cryptographically strong random bytes.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if fewer than `n` bytes of capacity
    /// remain; [`ErrorKind::Bug`] if the RNG fails.
    pub fn add_random(&mut self, n: usize) -> Result<()> {
        if n > self.max_len - self.len() {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("random bytes do not fit (free: {}, requested: {n})", self.free()),
            ));
        }
        let start = self.data.len();
        self.data.resize(start + n, 0);
        rng::fill(&mut self.data[start..])?;
        Ok(())
    }

    /// Replaces the contents with random bytes up to the full capacity.
    pub fn fill_random(&mut self) -> Result<()> {
        self.data.clear();
        self.add_random(self.max_len)
    }

    /// Replaces the contents with a copy of `src`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if `src` exceeds the capacity.
    pub fn consume(&mut self, src: &[u8]) -> Result<()> {
        if src.len() > self.max_len {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("source exceeds capacity (max: {}, got: {})", self.max_len, src.len()),
            ));
        }
        self.data.clear();
        self.data.extend_from_slice(src);
        Ok(())
    }

    /// Appends a copy of `src`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if `src` does not fit in the
    /// remaining capacity.
    pub fn add_consume(&mut self, src: &[u8]) -> Result<()> {
        if src.len() > self.free() {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("source exceeds free space (free: {}, got: {})", self.free(), src.len()),
            ));
        }
        self.data.extend_from_slice(src);
        Ok(())
    }

    /// Copies the set bytes into `dst`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if `dst` is shorter than the current
    /// length.
    pub fn copy_to_slice(&self, dst: &mut [u8]) -> Result<()> {
        if dst.len() < self.len() {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("destination too small (len: {}, dst: {})", self.len(), dst.len()),
            ));
        }
        dst[..self.len()].copy_from_slice(&self.data);
        Ok(())
    }

    /// Returns a freshly allocated buffer holding bytes `lo..hi`, with
    /// capacity `hi - lo`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] unless `lo <= hi <= len`.
    pub fn copy_sub(&self, lo: usize, hi: usize) -> Result<Self> {
        if lo > hi || hi > self.len() {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("invalid subrange {lo}..{hi} of {} bytes", self.len()),
            ));
        }
        Ok(Self::from_slice(&self.data[lo..hi]))
    }

    /// Elementwise addition mod 256. Both operands must have equal
    /// length; the result's capacity is the smaller of the two operands'
    /// capacities.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.elementwise(other, u8::wrapping_add)
    }

    /// Elementwise subtraction mod 256 (`self - other`). Both operands
    /// must have equal length; the result's capacity is the smaller of
    /// the two operands' capacities.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.elementwise(other, u8::wrapping_sub)
    }

    /// Interprets the set bytes as a big-endian integer.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if more than 8 bytes are set.
    pub fn to_long(&self) -> Result<u64> {
        if self.len() > 8 {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("{} bytes do not fit into a u64", self.len()),
            ));
        }
        let mut value = 0u64;
        for &b in &self.data {
            value = (value << 8) | u64::from(b);
        }
        Ok(value)
    }

    /// Returns the uppercase hex representation (`2 * len` characters).
    pub fn to_hex(&self) -> String {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        let mut out = String::with_capacity(self.len() * 2);
        for &b in &self.data {
            out.push(HEX[usize::from(b >> 4)] as char);
            out.push(HEX[usize::from(b & 0x0F)] as char);
        }
        out
    }

    fn free(&self) -> usize {
        self.max_len - self.data.len()
    }

    fn elementwise(&self, other: &Self, op: fn(u8, u8) -> u8) -> Result<Self> {
        if self.len() != other.len() {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("operands have different lengths ({} vs {})", self.len(), other.len()),
            ));
        }
        let mut out = Self::new(self.max_len.min(other.max_len));
        out.data
            .extend(self.data.iter().zip(&other.data).map(|(&a, &b)| op(a, b)));
        Ok(out)
    }
}

impl std::fmt::Debug for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // contents may be key material, show sizes only
        f.debug_struct("Bytes")
            .field("len", &self.len())
            .field("max_len", &self.max_len)
            .finish()
    }
}

impl Zeroize for Bytes {
    fn zeroize(&mut self) {
        self.data.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let b = Bytes::new(4);
        assert_eq!(b.len(), 0);
        assert_eq!(b.max_len(), 4);
        assert!(b.is_empty());
        assert!(!b.is_full());
    }

    #[test]
    fn test_add_byte_until_full() {
        let mut b = Bytes::new(2);
        b.add_byte(1).unwrap();
        b.add_byte(2).unwrap();
        assert!(b.is_full());
        let err = b.add_byte(3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthInvalid);
        assert_eq!(b.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_consume_replaces() {
        let mut b = Bytes::new(4);
        b.add_byte(9).unwrap();
        b.consume(&[1, 2, 3]).unwrap();
        assert_eq!(b.as_slice(), &[1, 2, 3]);
        assert!(b.consume(&[0; 5]).is_err());
        // failed consume leaves contents alone
        assert_eq!(b.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_add_consume_appends() {
        let mut b = Bytes::new(4);
        b.add_consume(&[1, 2]).unwrap();
        b.add_consume(&[3]).unwrap();
        assert_eq!(b.as_slice(), &[1, 2, 3]);
        assert!(b.add_consume(&[4, 5]).is_err());
    }

    #[test]
    fn test_add_random_respects_capacity() {
        let mut b = Bytes::new(8);
        b.add_random(5).unwrap();
        assert_eq!(b.len(), 5);
        assert!(b.add_random(4).is_err());
        b.add_random(3).unwrap();
        assert!(b.is_full());
    }

    #[test]
    fn test_fill_random_replaces() {
        let mut b = Bytes::new(16);
        b.add_byte(0).unwrap();
        b.fill_random().unwrap();
        assert_eq!(b.len(), 16);
    }

    #[test]
    fn test_copy_sub() {
        let b = Bytes::from_slice(&[10, 20, 30, 40]);
        let sub = b.copy_sub(1, 3).unwrap();
        assert_eq!(sub.as_slice(), &[20, 30]);
        assert_eq!(sub.max_len(), 2);
        // empty slice is fine
        assert_eq!(b.copy_sub(2, 2).unwrap().len(), 0);
        assert!(b.copy_sub(3, 2).is_err());
        assert!(b.copy_sub(0, 5).is_err());
    }

    #[test]
    fn test_copy_to_slice() {
        let b = Bytes::from_slice(&[1, 2, 3]);
        let mut dst = [0u8; 4];
        b.copy_to_slice(&mut dst).unwrap();
        assert_eq!(&dst[..3], &[1, 2, 3]);
        let mut small = [0u8; 2];
        assert!(b.copy_to_slice(&mut small).is_err());
    }

    #[test]
    fn test_add_sub_mod_256() {
        let a = Bytes::from_slice(&[250, 1, 128]);
        let b = Bytes::from_slice(&[10, 255, 128]);
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.as_slice(), &[4, 0, 0]);
        let back = sum.try_sub(&b).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn test_add_length_mismatch() {
        let a = Bytes::from_slice(&[1, 2]);
        let b = Bytes::from_slice(&[1]);
        assert_eq!(a.try_add(&b).unwrap_err().kind(), ErrorKind::LengthInvalid);
    }

    #[test]
    fn test_result_capacity_is_smaller() {
        let mut a = Bytes::new(10);
        a.add_consume(&[1, 2]).unwrap();
        let b = Bytes::from_slice(&[3, 4]);
        assert_eq!(a.try_add(&b).unwrap().max_len(), 2);
    }

    #[test]
    fn test_long_round_trip() {
        let b = Bytes::from_long(0x0102_0304);
        assert_eq!(b.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(b.to_long().unwrap(), 0x0102_0304);

        assert_eq!(Bytes::from_long(0).len(), 0);
        assert_eq!(Bytes::from_long(0).to_long().unwrap(), 0);
        assert_eq!(Bytes::from_long(u64::MAX).len(), 8);
    }

    #[test]
    fn test_to_long_rejects_over_8() {
        let b = Bytes::from_slice(&[0; 9]);
        assert_eq!(b.to_long().unwrap_err().kind(), ErrorKind::LengthInvalid);
    }

    #[test]
    fn test_to_hex_uppercase() {
        let b = Bytes::from_slice(&[0x00, 0xAB, 0xFF]);
        assert_eq!(b.to_hex(), "00ABFF");
        assert_eq!(Bytes::new(3).to_hex(), "");
    }

    #[test]
    fn test_equality_requires_equal_contents() {
        let a = Bytes::from_slice(&[1, 2]);
        let mut b = Bytes::new(10);
        b.add_consume(&[1, 2]).unwrap();
        // capacities differ, contents decide
        assert_ne!(a.max_len(), b.max_len());
        assert_eq!(a, b);
        assert_ne!(a, Bytes::from_slice(&[1, 2, 0]));
    }

    #[test]
    fn test_debug_hides_contents() {
        let b = Bytes::from_slice(b"secret");
        let dbg = format!("{b:?}");
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("len"));
    }

    #[test]
    fn test_zeroize() {
        let mut b = Bytes::from_slice(&[1, 2, 3]);
        b.zeroize();
        assert!(b.is_empty());
    }
}
