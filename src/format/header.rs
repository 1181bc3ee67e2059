//! Data header codec.
//!
//! The header is the file-prefix metadata record that makes a container
//! self-describing. Serialized layout (big-endian for multi-byte
//! integers):
//!
//! ```text
//! offset 0  : file_size (u64)
//! offset 8  : header_size (u64)
//! offset 16 : file_mode (u8)
//! offset 17 : hash_mode (u8)
//! offset 18 : chainhash1_mode (u8)
//! offset 19 : chainhash1_iters (u64)
//! offset 27 : chainhash1_datablock_len (u8)
//! offset 28 : chainhash1_datablock bytes
//!           : chainhash2_mode (u8)
//!           : chainhash2_iters (u64)
//!           : chainhash2_datablock_len (u8)
//!           : chainhash2_datablock bytes
//!           : valid_passwordhash (hash_size bytes)
//!           : enc_salt (hash_size bytes)
//!           : dec datablocks, each: type (u8), len (u8), bytes[len]
//! ```
//!
//! `header_size` counts everything above including the two size
//! prefixes; the dec datablocks fill the remainder of the header region,
//! so no count byte is stored. `file_size` is the total file length
//! including the payload and is patched in by the file writer once that
//! length is known; [`DataHeader::set_file_size`] does so without
//! re-serializing.

use std::io::Read;

use crate::bytes::Bytes;
use crate::chainhash::{ChainHash, ChainHashData, ChainHashMode, Format};
use crate::error::{Error, ErrorKind};
use crate::hash::HashMode;
use crate::settings::MAX_FILEMODE_NUMBER;
use crate::Result;

/// Byte length of the fixed header fields from offset 16 (modes,
/// iteration counts, datablock length bytes).
const FIXED_FIELDS_LEN: u64 = 22;
/// Byte length of the two u64 size prefixes.
const SIZE_PREFIX_LEN: u64 = 16;

/// One payload-layer metadata record stored in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecDatablock {
    /// Payload-defined type tag.
    pub dtype: u8,
    /// Record bytes, at most 255.
    pub data: Bytes,
}

/// The in-memory file header.
///
/// Constructed with a hash mode, populated by setters, serialized once
/// [`calc_header_bytes`](Self::calc_header_bytes) succeeds, and parsed
/// back with [`parse`](Self::parse).
#[derive(Debug, Clone)]
pub struct DataHeader {
    file_mode: u8,
    hash_mode: HashMode,
    chainhash1: Option<ChainHash>,
    chainhash2: Option<ChainHash>,
    valid_passwordhash: Option<Bytes>,
    enc_salt: Option<Bytes>,
    dec_datablocks: Vec<DecDatablock>,
    file_size: u64,
    header_bytes: Option<Vec<u8>>,
}

impl PartialEq for DataHeader {
    fn eq(&self, other: &Self) -> bool {
        // the serialized cache is derived state
        self.file_mode == other.file_mode
            && self.hash_mode == other.hash_mode
            && self.chainhash1 == other.chainhash1
            && self.chainhash2 == other.chainhash2
            && self.valid_passwordhash == other.valid_passwordhash
            && self.enc_salt == other.enc_salt
            && self.dec_datablocks == other.dec_datablocks
    }
}

impl Eq for DataHeader {}

impl DataHeader {
    /// Creates an empty header for the given hash mode.
    pub fn new(hash_mode: HashMode) -> Self {
        Self {
            file_mode: 0,
            hash_mode,
            chainhash1: None,
            chainhash2: None,
            valid_passwordhash: None,
            enc_salt: None,
            dec_datablocks: Vec::new(),
            file_size: 0,
            header_bytes: None,
        }
    }

    /// Returns the hash mode and thereby the hash size of every
    /// hash-sized field.
    pub fn hash_mode(&self) -> HashMode {
        self.hash_mode
    }

    /// Returns the payload schema tag.
    pub fn file_mode(&self) -> u8 {
        self.file_mode
    }

    /// Returns the first chainhash (password to password hash), if set.
    pub fn chainhash1(&self) -> Option<&ChainHash> {
        self.chainhash1.as_ref()
    }

    /// Returns the second chainhash (password hash to validator), if set.
    pub fn chainhash2(&self) -> Option<&ChainHash> {
        self.chainhash2.as_ref()
    }

    /// Returns the password validator, if set.
    pub fn valid_passwordhash(&self) -> Option<&Bytes> {
        self.valid_passwordhash.as_ref()
    }

    /// Returns the encrypted master salt, if calculated.
    pub fn enc_salt(&self) -> Option<&Bytes> {
        self.enc_salt.as_ref()
    }

    /// Returns the payload-layer datablocks.
    pub fn dec_datablocks(&self) -> &[DecDatablock] {
        &self.dec_datablocks
    }

    /// Returns the total file size recorded at offset 0.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Sets the payload schema tag.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileModeInvalid`] for tags outside the valid range.
    pub fn set_file_mode(&mut self, file_mode: u8) -> Result<()> {
        if !(1..=MAX_FILEMODE_NUMBER).contains(&file_mode) {
            return Err(Error::ctx(
                ErrorKind::FileModeInvalid,
                format!("file mode {file_mode}"),
            ));
        }
        self.file_mode = file_mode;
        self.header_bytes = None;
        Ok(())
    }

    /// Sets the first chainhash.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Chainhash1Invalid`] if the record fails validation.
    pub fn set_chainhash1(&mut self, chainhash: ChainHash) -> Result<()> {
        chainhash
            .validate()
            .map_err(|e| Error::ctx(ErrorKind::Chainhash1Invalid, e.to_string()))?;
        self.chainhash1 = Some(chainhash);
        self.header_bytes = None;
        Ok(())
    }

    /// Sets the second chainhash.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Chainhash2Invalid`] if the record fails validation.
    pub fn set_chainhash2(&mut self, chainhash: ChainHash) -> Result<()> {
        chainhash
            .validate()
            .map_err(|e| Error::ctx(ErrorKind::Chainhash2Invalid, e.to_string()))?;
        self.chainhash2 = Some(chainhash);
        self.header_bytes = None;
        Ok(())
    }

    /// Sets the password validator.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] unless the validator is exactly
    /// `hash_size` bytes.
    pub fn set_valid_passwordhash(&mut self, validator: Bytes) -> Result<()> {
        if validator.len() != self.hash_mode.hash_size() {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!(
                    "validator must match the hash size (len: {}, hash size: {})",
                    validator.len(),
                    self.hash_mode.hash_size()
                ),
            ));
        }
        self.valid_passwordhash = Some(validator);
        self.header_bytes = None;
        Ok(())
    }

    /// Appends a payload-layer datablock.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DatablockTooLong`] for records over 255 bytes.
    pub fn add_dec_datablock(&mut self, datablock: DecDatablock) -> Result<()> {
        if datablock.data.len() > 255 {
            return Err(Error::ctx(
                ErrorKind::DatablockTooLong,
                format!("dec datablock of {} bytes", datablock.data.len()),
            ));
        }
        self.dec_datablocks.push(datablock);
        self.header_bytes = None;
        Ok(())
    }

    /// Returns the header length in bytes, including the size prefixes.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::WrongWorkflow`] until both chainhashes are set.
    pub fn header_size(&self) -> Result<u64> {
        let (ch1, ch2) = match (&self.chainhash1, &self.chainhash2) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(Error::ctx(
                    ErrorKind::WrongWorkflow,
                    "header length requires both chainhashes",
                ));
            }
        };
        let dec: u64 = self
            .dec_datablocks
            .iter()
            .map(|d| 2 + d.data.len() as u64)
            .sum();
        Ok(SIZE_PREFIX_LEN
            + FIXED_FIELDS_LEN
            + 2 * self.hash_mode.hash_size() as u64
            + ch1.datablock().len() as u64
            + ch2.datablock().len() as u64
            + dec)
    }

    /// Serializes the header.
    ///
    /// Verifies the password hash against the stored validator when
    /// `verify_pwhash` is set, generates a fresh random master salt,
    /// encrypts it as `salt + pwhash` (elementwise mod 256, not XOR,
    /// and the iterator downstream is seeded with this encrypted form)
    /// and emits the full layout. The `file_size` field is initialized
    /// to the header size and patched by the file writer via
    /// [`set_file_size`](Self::set_file_size).
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::WrongWorkflow`] if required fields are missing.
    /// - [`ErrorKind::PasswordInvalid`] if verification fails.
    /// - [`ErrorKind::Bug`] if the emitted length disagrees with the
    ///   computed header size.
    pub fn calc_header_bytes(&mut self, pwhash: &Bytes, verify_pwhash: bool) -> Result<()> {
        if self.chainhash1.is_none()
            || self.chainhash2.is_none()
            || self.valid_passwordhash.is_none()
            || !(1..=MAX_FILEMODE_NUMBER).contains(&self.file_mode)
        {
            return Err(Error::ctx(
                ErrorKind::WrongWorkflow,
                "not all data is set to calculate the header",
            ));
        }
        if pwhash.len() != self.hash_mode.hash_size() {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                "password hash must match the hash size",
            ));
        }
        if verify_pwhash {
            let validator = self
                .chainhash2
                .as_ref()
                .expect("checked above")
                .perform(self.hash_mode, pwhash.as_slice())?;
            if &validator != self.valid_passwordhash.as_ref().expect("checked above") {
                return Err(Error::ctx(
                    ErrorKind::PasswordInvalid,
                    "password hash does not match the validator",
                ));
            }
        }

        let salt = Bytes::random(self.hash_mode.hash_size())?;
        self.enc_salt = Some(salt.try_add(pwhash)?);

        let header_size = self.header_size()?;
        self.file_size = header_size;
        let bytes = self.serialize(header_size)?;
        if bytes.len() as u64 != header_size {
            return Err(Error::ctx(
                ErrorKind::Bug,
                format!(
                    "serialized header has {} bytes, expected {header_size}",
                    bytes.len()
                ),
            ));
        }
        self.header_bytes = Some(bytes);
        Ok(())
    }

    /// Returns the serialized header.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::WrongWorkflow`] before a successful
    /// [`calc_header_bytes`](Self::calc_header_bytes).
    pub fn header_bytes(&self) -> Result<&[u8]> {
        self.header_bytes.as_deref().ok_or_else(|| {
            Error::ctx(ErrorKind::WrongWorkflow, "header bytes are not calculated")
        })
    }

    /// Patches the `file_size` field in the already serialized header.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::WrongWorkflow`] if no header is serialized.
    /// - [`ErrorKind::LengthInvalid`] if `file_size` is smaller than the
    ///   header itself.
    pub fn set_file_size(&mut self, file_size: u64) -> Result<()> {
        let header_size = self.header_size()?;
        let bytes = self.header_bytes.as_mut().ok_or_else(|| {
            Error::ctx(ErrorKind::WrongWorkflow, "header bytes are not calculated")
        })?;
        if file_size < header_size {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("file size {file_size} is smaller than the header ({header_size})"),
            ));
        }
        bytes[..8].copy_from_slice(&file_size.to_be_bytes());
        self.file_size = file_size;
        Ok(())
    }

    fn serialize(&self, file_size: u64) -> Result<Vec<u8>> {
        let header_size = self.header_size()?;
        let mut out = Vec::with_capacity(header_size as usize);
        out.extend_from_slice(&file_size.to_be_bytes());
        out.extend_from_slice(&header_size.to_be_bytes());
        out.push(self.file_mode);
        out.push(self.hash_mode.as_u8());
        for chainhash in [&self.chainhash1, &self.chainhash2] {
            let chainhash = chainhash.as_ref().expect("presence checked by header_size");
            out.push(chainhash.mode().as_u8());
            out.extend_from_slice(&chainhash.iters().to_be_bytes());
            let datablock = chainhash.datablock().datablock()?;
            out.push(datablock.len() as u8);
            out.extend_from_slice(datablock.as_slice());
        }
        out.extend_from_slice(
            self.valid_passwordhash
                .as_ref()
                .expect("presence checked by caller")
                .as_slice(),
        );
        out.extend_from_slice(
            self.enc_salt
                .as_ref()
                .expect("set before serialization")
                .as_slice(),
        );
        for dec in &self.dec_datablocks {
            out.push(dec.dtype);
            out.push(dec.data.len() as u8);
            out.extend_from_slice(dec.data.as_slice());
        }
        Ok(out)
    }

    /// Parses a header from a stream, validating every field.
    ///
    /// The reader is left positioned at the first payload byte, so the
    /// caller can keep using it for the ciphertext.
    ///
    /// # Errors
    ///
    /// Mode, iteration and length violations surface as their specific
    /// kinds with the offending field named in the context; truncated
    /// input surfaces as [`ErrorKind::NotEnoughData`].
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let file_size = read_u64(reader, "file_size")?;
        let header_size = read_u64(reader, "header_size")?;
        if file_size < header_size {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("file_size {file_size} is smaller than header_size {header_size}"),
            ));
        }

        let file_mode = read_u8(reader, "file_mode")?;
        if !(1..=MAX_FILEMODE_NUMBER).contains(&file_mode) {
            return Err(Error::ctx(
                ErrorKind::FileModeInvalid,
                format!("file_mode {file_mode}"),
            ));
        }
        let hash_mode = HashMode::from_u8(read_u8(reader, "hash_mode")?)
            .map_err(|e| Error::ctx(e.kind(), "hash_mode"))?;

        let chainhash1 = parse_chainhash(reader, "chainhash1")?;
        let chainhash2 = parse_chainhash(reader, "chainhash2")?;

        let hash_size = hash_mode.hash_size();
        let valid_passwordhash =
            Bytes::from_slice(&read_exact(reader, hash_size, "valid_passwordhash")?);
        let enc_salt = Bytes::from_slice(&read_exact(reader, hash_size, "enc_salt")?);

        let consumed = FIXED_FIELDS_LEN
            + chainhash1.datablock().len() as u64
            + chainhash2.datablock().len() as u64
            + 2 * hash_size as u64;
        let mut remaining = header_size
            .checked_sub(SIZE_PREFIX_LEN + consumed)
            .ok_or_else(|| {
                Error::ctx(
                    ErrorKind::LengthInvalid,
                    format!("header_size {header_size} is smaller than its fixed fields"),
                )
            })?;

        let mut dec_datablocks = Vec::new();
        while remaining > 0 {
            if remaining < 2 {
                return Err(Error::ctx(ErrorKind::NotEnoughData, "dec_datablock"));
            }
            let dtype = read_u8(reader, "dec_datablock_type")?;
            let len = read_u8(reader, "dec_datablock_len")?;
            if u64::from(len) + 2 > remaining {
                return Err(Error::ctx(
                    ErrorKind::LengthInvalid,
                    format!("dec_datablock of {len} bytes exceeds the header region"),
                ));
            }
            let data = Bytes::from_slice(&read_exact(reader, usize::from(len), "dec_datablock")?);
            remaining -= 2 + u64::from(len);
            dec_datablocks.push(DecDatablock { dtype, data });
        }

        let mut header = Self {
            file_mode,
            hash_mode,
            chainhash1: Some(chainhash1),
            chainhash2: Some(chainhash2),
            valid_passwordhash: Some(valid_passwordhash),
            enc_salt: Some(enc_salt),
            dec_datablocks,
            file_size,
            header_bytes: None,
        };
        // regenerate the serialized form; it must agree with header_size
        let bytes = header.serialize(file_size)?;
        if bytes.len() as u64 != header_size {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!("header_size {header_size} disagrees with {} parsed bytes", bytes.len()),
            ));
        }
        header.header_bytes = Some(bytes);
        Ok(header)
    }
}

fn parse_chainhash<R: Read>(reader: &mut R, field: &str) -> Result<ChainHash> {
    let mode = ChainHashMode::from_u8(read_u8(reader, &format!("{field}_mode"))?)
        .map_err(|e| Error::ctx(e.kind(), format!("{field}_mode")))?;
    let iters = read_u64(reader, &format!("{field}_iters"))?;
    let datablock_len = usize::from(read_u8(reader, &format!("{field}_datablock_len"))?);
    let raw = read_exact(reader, datablock_len, &format!("{field}_datablock"))?;

    let format = Format::for_mode(mode);
    if datablock_len < format.fixed_len()
        || (!format.has_variable_slot() && datablock_len != format.fixed_len())
    {
        return Err(Error::ctx(
            ErrorKind::ChainhashFormatInvalid,
            format!("{field}_datablock_len {datablock_len}"),
        ));
    }

    let mut data = ChainHashData::new(format);
    let mut offset = 0;
    for slot in format.slots() {
        let take = if slot.len == 0 {
            datablock_len - offset
        } else {
            usize::from(slot.len)
        };
        data.add_part(Bytes::from_slice(&raw[offset..offset + take]))
            .map_err(|e| Error::ctx(e.kind(), format!("{field} part {}", slot.name)))?;
        offset += take;
    }

    ChainHash::new(mode, iters, data).map_err(|e| Error::ctx(e.kind(), field.to_string()))
}

fn read_exact<R: Read>(reader: &mut R, len: usize, field: &str) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::ctx(ErrorKind::NotEnoughData, field.to_string())
        } else {
            Error::ctx(ErrorKind::FileRead, format!("{field}: {e}"))
        }
    })?;
    Ok(buf)
}

fn read_u8<R: Read>(reader: &mut R, field: &str) -> Result<u8> {
    Ok(read_exact(reader, 1, field)?[0])
}

fn read_u64<R: Read>(reader: &mut R, field: &str) -> Result<u64> {
    let buf = read_exact(reader, 8, field)?;
    Ok(u64::from_be_bytes(buf.try_into().expect("8 bytes read")))
}
