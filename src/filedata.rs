//! Payload schemas.
//!
//! The container itself is payload-agnostic; the `file_mode` byte in the
//! header selects how the decrypted bytes are interpreted. Mode 1 stores
//! password records. [`FileDataStruct`] carries (mode, raw bytes) through
//! the API without committing to a schema; [`PasswordData`] is the
//! schema handler for mode 1.

use std::collections::BTreeMap;

use crate::bytes::Bytes;
use crate::error::{Error, ErrorKind};
use crate::settings::MAX_FILEMODE_NUMBER;
use crate::Result;

/// Checks a file mode tag against the valid range.
pub fn is_file_mode_valid(file_mode: u8) -> bool {
    (1..=MAX_FILEMODE_NUMBER).contains(&file_mode)
}

/// Decrypted payload plus the schema tag it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDataStruct {
    /// Payload schema tag from the header.
    pub file_mode: u8,
    /// The raw decrypted bytes.
    pub data: Bytes,
}

impl FileDataStruct {
    /// Creates a payload carrier.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileModeInvalid`] for unknown schema tags.
    pub fn new(file_mode: u8, data: Bytes) -> Result<Self> {
        if !is_file_mode_valid(file_mode) {
            return Err(Error::ctx(
                ErrorKind::FileModeInvalid,
                format!("file mode {file_mode}"),
            ));
        }
        Ok(Self { file_mode, data })
    }
}

/// One stored credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordRecord {
    /// Account or user name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// The stored password.
    pub password: String,
}

/// Password records, the payload schema behind file mode 1.
///
/// Serialized as a flat sequence of length-prefixed fields per site:
/// `site_len site user_len user email_len email password_len password`.
/// Site names are unique and must not start with `-` (reserved for
/// command flags in consumers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordData {
    records: BTreeMap<String, PasswordRecord>,
}

impl PasswordData {
    /// The file mode this schema is registered under.
    pub const FILE_MODE: u8 = 1;

    /// Creates an empty record set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses record bytes produced by [`to_file_data`](Self::to_file_data).
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::FileModeInvalid`] if the struct belongs to another
    ///   schema.
    /// - [`ErrorKind::FileDataInvalid`] naming the defect: truncated
    ///   fields, duplicate sites, or a site starting with `-`.
    pub fn from_file_data(file_data: &FileDataStruct) -> Result<Self> {
        if file_data.file_mode != Self::FILE_MODE {
            return Err(Error::ctx(
                ErrorKind::FileModeInvalid,
                format!("file mode {} is not password data", file_data.file_mode),
            ));
        }
        let bytes = file_data.data.as_slice();
        let mut records = BTreeMap::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let site = read_field(bytes, &mut offset, "site")?;
            if site.starts_with('-') {
                return Err(Error::ctx(
                    ErrorKind::FileDataInvalid,
                    format!("site {site} starts with the illegal character '-'"),
                ));
            }
            let username = read_field(bytes, &mut offset, "username")?;
            let email = read_field(bytes, &mut offset, "email")?;
            let password = read_field(bytes, &mut offset, "password")?;
            if records
                .insert(
                    site.clone(),
                    PasswordRecord {
                        username,
                        email,
                        password,
                    },
                )
                .is_some()
            {
                return Err(Error::ctx(
                    ErrorKind::FileDataInvalid,
                    format!("site {site} occurs multiple times"),
                ));
            }
        }
        Ok(Self { records })
    }

    /// Serializes the records for encryption.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LengthInvalid`] if any field exceeds 255 bytes.
    pub fn to_file_data(&self) -> Result<FileDataStruct> {
        let mut out = Vec::new();
        for (site, record) in &self.records {
            for field in [site, &record.username, &record.email, &record.password] {
                if field.len() > 255 {
                    return Err(Error::ctx(
                        ErrorKind::LengthInvalid,
                        format!("field of {} bytes in site {site}", field.len()),
                    ));
                }
                out.push(field.len() as u8);
                out.extend_from_slice(field.as_bytes());
            }
        }
        FileDataStruct::new(Self::FILE_MODE, Bytes::from_slice(&out))
    }

    /// Adds or replaces the record for a site.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileDataInvalid`] for empty sites or sites starting
    /// with `-`.
    pub fn set(&mut self, site: &str, record: PasswordRecord) -> Result<()> {
        if site.is_empty() || site.starts_with('-') {
            return Err(Error::ctx(
                ErrorKind::FileDataInvalid,
                format!("site name {site:?}"),
            ));
        }
        self.records.insert(site.to_string(), record);
        Ok(())
    }

    /// Returns the record for a site.
    pub fn get(&self, site: &str) -> Option<&PasswordRecord> {
        self.records.get(site)
    }

    /// Removes the record for a site, returning whether it existed.
    pub fn remove(&mut self, site: &str) -> bool {
        self.records.remove(site).is_some()
    }

    /// Iterates the records in site order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PasswordRecord)> {
        self.records.iter()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_field(bytes: &[u8], offset: &mut usize, field: &str) -> Result<String> {
    let len = usize::from(*bytes.get(*offset).ok_or_else(|| {
        Error::ctx(ErrorKind::FileDataInvalid, format!("missing {field} length"))
    })?);
    *offset += 1;
    let end = *offset + len;
    let raw = bytes.get(*offset..end).ok_or_else(|| {
        Error::ctx(ErrorKind::FileDataInvalid, format!("truncated {field}"))
    })?;
    *offset = end;
    String::from_utf8(raw.to_vec())
        .map_err(|_| Error::ctx(ErrorKind::FileDataInvalid, format!("{field} is not UTF-8")))
}
