//! Typed parameter container for a chainhash mode.
//!
//! A [`ChainHashData`] collects the parameter bytes of one chainhash in
//! the order its [`Format`] declares. Parts are validated against their
//! slot as they are added; once every slot is filled the datablock is
//! *complete* and can be serialized into the file header.

use crate::bytes::Bytes;
use crate::chainhash::format::Format;
use crate::error::{Error, ErrorKind};
use crate::Result;

/// Maximum serialized length of a datablock in bytes (its length is
/// stored in a single header byte).
pub const MAX_DATABLOCK_LEN: usize = 255;

/// A datablock matching a [`Format`]: ordered parts, each checked against
/// its schema slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHashData {
    format: Format,
    parts: Vec<Bytes>,
}

impl ChainHashData {
    /// Creates an empty datablock for the given schema.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            parts: Vec::with_capacity(format.slots().len()),
        }
    }

    /// Returns the schema this datablock is filled against.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns `true` once every schema slot holds a part.
    pub fn is_complete(&self) -> bool {
        self.parts.len() == self.format.slots().len()
    }

    /// Returns the number of parts set so far.
    pub fn parts_number(&self) -> usize {
        self.parts.len()
    }

    /// Returns the total byte length of the set parts.
    pub fn len(&self) -> usize {
        self.parts.iter().map(Bytes::len).sum()
    }

    /// Returns `true` if no parts are set.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Appends the next part in schema order.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::ChainhashDatablockAlreadyComplete`] if every slot is
    ///   already filled.
    /// - [`ErrorKind::ChainhashDatapartInvalid`] if the part's length does
    ///   not match its slot (fixed slots must match exactly, the variable
    ///   slot takes any non-zero length).
    /// - [`ErrorKind::ChainhashDatablockOutOfRange`] if the datablock
    ///   would exceed [`MAX_DATABLOCK_LEN`].
    pub fn add_part(&mut self, part: Bytes) -> Result<()> {
        if self.is_complete() {
            return Err(Error::new(ErrorKind::ChainhashDatablockAlreadyComplete));
        }
        let slot = self.format.slots()[self.parts.len()];
        if slot.len == 0 {
            if part.is_empty() {
                return Err(Error::ctx(
                    ErrorKind::ChainhashDatapartInvalid,
                    format!("part {} must not be empty", slot.name),
                ));
            }
        } else if part.len() != usize::from(slot.len) {
            return Err(Error::ctx(
                ErrorKind::ChainhashDatapartInvalid,
                format!("part {} must be {} bytes, got {}", slot.name, slot.len, part.len()),
            ));
        }
        if self.len() + part.len() > MAX_DATABLOCK_LEN {
            return Err(Error::ctx(
                ErrorKind::ChainhashDatablockOutOfRange,
                format!("datablock would grow to {} bytes", self.len() + part.len()),
            ));
        }
        self.parts.push(part);
        Ok(())
    }

    /// Returns the part stored under `name`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ChainhashDatapartInvalid`] if the schema has no such
    /// slot or the part is not set yet.
    pub fn part(&self, name: &str) -> Result<&Bytes> {
        self.format
            .slots()
            .iter()
            .position(|s| s.name == name)
            .and_then(|i| self.parts.get(i))
            .ok_or_else(|| Error::ctx(ErrorKind::ChainhashDatapartInvalid, format!("part {name}")))
    }

    /// Returns the concatenation of all parts in schema order.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DatablockNotComplete`] if any slot is still empty.
    pub fn datablock(&self) -> Result<Bytes> {
        if !self.is_complete() {
            return Err(Error::new(ErrorKind::DatablockNotComplete));
        }
        let mut out = Bytes::new(self.len());
        for part in &self.parts {
            out.add_consume(part.as_slice())?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chainhash::ChainHashMode;

    fn format(mode: ChainHashMode) -> Format {
        Format::for_mode(mode)
    }

    #[test]
    fn test_empty_format_is_complete() {
        let data = ChainHashData::new(format(ChainHashMode::Normal));
        assert!(data.is_complete());
        assert_eq!(data.len(), 0);
        assert_eq!(data.datablock().unwrap().len(), 0);
    }

    #[test]
    fn test_add_to_complete_fails() {
        let mut data = ChainHashData::new(format(ChainHashMode::Normal));
        let err = data.add_part(Bytes::from_slice(&[1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChainhashDatablockAlreadyComplete);
    }

    #[test]
    fn test_fixed_slot_length_checked() {
        let mut data = ChainHashData::new(format(ChainHashMode::CountSalt));
        let err = data.add_part(Bytes::from_slice(&[0; 7])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChainhashDatapartInvalid);
        data.add_part(Bytes::from_slice(&[0; 8])).unwrap();
        assert!(data.is_complete());
    }

    #[test]
    fn test_variable_slot_rejects_empty() {
        let mut data = ChainHashData::new(format(ChainHashMode::ConstantSalt));
        let err = data.add_part(Bytes::new(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChainhashDatapartInvalid);
        data.add_part(Bytes::from_slice(b"salt")).unwrap();
        assert!(data.is_complete());
    }

    #[test]
    fn test_variable_slot_respects_total_limit() {
        let mut data = ChainHashData::new(format(ChainHashMode::ConstantCountSalt));
        data.add_part(Bytes::from_slice(&[0; 8])).unwrap();
        // 8 fixed bytes are already used, 248 more would overflow 255
        let err = data.add_part(Bytes::from_slice(&[1; 248])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChainhashDatablockOutOfRange);
        data.add_part(Bytes::from_slice(&[1; 247])).unwrap();
        assert_eq!(data.len(), 255);
    }

    #[test]
    fn test_part_lookup() {
        let mut data = ChainHashData::new(format(ChainHashMode::Quadratic));
        for v in 1..=4u8 {
            data.add_part(Bytes::from_slice(&[v; 8])).unwrap();
        }
        assert_eq!(data.part("SN").unwrap().as_slice(), &[1; 8]);
        assert_eq!(data.part("B").unwrap().as_slice(), &[3; 8]);
        assert_eq!(
            data.part("X").unwrap_err().kind(),
            ErrorKind::ChainhashDatapartInvalid
        );
    }

    #[test]
    fn test_part_lookup_before_set_fails() {
        let mut data = ChainHashData::new(format(ChainHashMode::ConstantCountSalt));
        data.add_part(Bytes::from_slice(&[0; 8])).unwrap();
        assert!(data.part("SN").is_ok());
        assert!(data.part("S").is_err());
    }

    #[test]
    fn test_datablock_concatenates_in_order() {
        let mut data = ChainHashData::new(format(ChainHashMode::ConstantCountSalt));
        assert_eq!(
            data.datablock().unwrap_err().kind(),
            ErrorKind::DatablockNotComplete
        );
        data.add_part(Bytes::from_slice(&[9; 8])).unwrap();
        data.add_part(Bytes::from_slice(b"ab")).unwrap();
        let block = data.datablock().unwrap();
        assert_eq!(block.as_slice(), &[9, 9, 9, 9, 9, 9, 9, 9, b'a', b'b']);
    }

    #[test]
    fn test_equality_compares_format_and_parts() {
        let mut a = ChainHashData::new(format(ChainHashMode::CountSalt));
        a.add_part(Bytes::from_slice(&[0; 8])).unwrap();
        let mut b = ChainHashData::new(format(ChainHashMode::CountSalt));
        b.add_part(Bytes::from_slice(&[0; 8])).unwrap();
        assert_eq!(a, b);

        let mut c = ChainHashData::new(format(ChainHashMode::CountSalt));
        c.add_part(Bytes::from_slice(&[1; 8])).unwrap();
        assert_ne!(a, c);
    }
}
