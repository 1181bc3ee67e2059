//! Container file access.
//!
//! [`FileHandle`] wraps one `.enc` file and separates its header region
//! from its payload region: callers read metadata through
//! [`FileHandle::get_data_header`] and stream ciphertext through
//! [`FileHandle::get_data_stream`] without loading the whole file.
//!
//! [`AppSettings`] is the small app-data file (`<setting_name> <value>`
//! per line) that remembers things like the last-used encryption
//! directory between runs.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind};
use crate::format::DataHeader;
use crate::settings::FILE_EXTENSION;
use crate::Result;

fn check_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::new(ErrorKind::EmptyFilePath));
    }
    if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
        return Err(Error::ctx(
            ErrorKind::ExtensionInvalid,
            format!("expected .{FILE_EXTENSION} file, got {}", path.display()),
        ));
    }
    Ok(())
}

/// Handle to one container file.
///
/// The parsed header and size metadata are cached; any write through the
/// handle resets the cache.
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    header: Option<DataHeader>,
}

impl FileHandle {
    /// Opens a handle to an existing `.enc` file.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::EmptyFilePath`], [`ErrorKind::ExtensionInvalid`] or
    /// [`ErrorKind::FileNotFound`].
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        check_path(&path)?;
        if !path.is_file() {
            return Err(Error::ctx(
                ErrorKind::FileNotFound,
                path.display().to_string(),
            ));
        }
        Ok(Self { path, header: None })
    }

    /// Creates a new empty `.enc` file and returns a handle to it.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileExists`] if the path is already taken,
    /// [`ErrorKind::FileNotCreated`] if the filesystem refuses.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        check_path(&path)?;
        if path.exists() {
            return Err(Error::ctx(ErrorKind::FileExists, path.display().to_string()));
        }
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                Error::ctx(ErrorKind::FileNotCreated, format!("{}: {e}", path.display()))
            })?;
        log::info!("created container file {}", path.display());
        Ok(Self { path, header: None })
    }

    /// Returns the wrapped path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current on-disk file size in bytes.
    pub fn file_size(&self) -> Result<u64> {
        Ok(std::fs::metadata(&self.path)
            .map_err(|e| Error::ctx(ErrorKind::FileNotOpen, e.to_string()))?
            .len())
    }

    /// Returns `true` if the file holds no bytes.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.file_size()? == 0)
    }

    /// Returns the header size declared at offset 8.
    pub fn header_size(&self) -> Result<u64> {
        let bytes = self.first_bytes(16)?;
        Ok(u64::from_be_bytes(bytes[8..16].try_into().expect("8 bytes")))
    }

    /// Reads the first `n` bytes of the file.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NotEnoughData`] if the file is shorter than `n`.
    pub fn first_bytes(&self, n: usize) -> Result<Vec<u8>> {
        let mut reader = self.get_read_stream()?;
        let mut buf = vec![0u8; n];
        reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::ctx(ErrorKind::NotEnoughData, format!("first {n} bytes"))
            } else {
                Error::ctx(ErrorKind::FileRead, e.to_string())
            }
        })?;
        Ok(buf)
    }

    /// Overwrites the file, but only if it is currently empty.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileNotEmpty`] if bytes are already present.
    pub fn write_bytes_if_empty(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.is_empty()? {
            return Err(Error::ctx(
                ErrorKind::FileNotEmpty,
                self.path.display().to_string(),
            ));
        }
        self.write_bytes(bytes)
    }

    /// Overwrites the file unconditionally.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut stream = self.get_write_stream()?;
        stream.write_all(bytes)?;
        stream.flush()?;
        Ok(())
    }

    /// Opens a truncating write stream. Cached metadata is reset.
    pub fn get_write_stream(&mut self) -> Result<BufWriter<File>> {
        self.header = None;
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| Error::ctx(ErrorKind::FileNotOpen, e.to_string()))?;
        Ok(BufWriter::new(file))
    }

    /// Opens a truncating write stream, but only on an empty file.
    pub fn get_write_stream_if_empty(&mut self) -> Result<BufWriter<File>> {
        if !self.is_empty()? {
            return Err(Error::ctx(
                ErrorKind::FileNotEmpty,
                self.path.display().to_string(),
            ));
        }
        self.get_write_stream()
    }

    /// Opens a read stream positioned at the start of the file.
    pub fn get_read_stream(&self) -> Result<BufReader<File>> {
        let file = File::open(&self.path)
            .map_err(|e| Error::ctx(ErrorKind::FileNotOpen, e.to_string()))?;
        Ok(BufReader::new(file))
    }

    /// Opens a read stream positioned at the first payload byte.
    pub fn get_data_stream(&self) -> Result<BufReader<File>> {
        let header_size = self.header_size()?;
        let mut reader = self.get_read_stream()?;
        reader
            .seek(SeekFrom::Start(header_size))
            .map_err(|e| Error::ctx(ErrorKind::FileRead, e.to_string()))?;
        Ok(reader)
    }

    /// Re-parses the header from disk and caches it.
    ///
    /// # Errors
    ///
    /// Any header parse error, or [`ErrorKind::LengthInvalid`] if the
    /// declared file size disagrees with the actual byte count.
    pub fn update(&mut self) -> Result<()> {
        self.header = None;
        let mut reader = self.get_read_stream()?;
        let header = DataHeader::parse(&mut reader)?;
        let actual = self.file_size()?;
        if header.file_size() != actual {
            return Err(Error::ctx(
                ErrorKind::LengthInvalid,
                format!(
                    "declared file size {} disagrees with {actual} bytes on disk",
                    header.file_size()
                ),
            ));
        }
        self.header = Some(header);
        Ok(())
    }

    /// Cheap check whether the file could hold a header for `file_mode`:
    /// inspects only the first byte positions without a full parse.
    pub fn is_data_header(&self, file_mode: u8) -> Result<bool> {
        let bytes = match self.first_bytes(18) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotEnoughData => return Ok(false),
            Err(e) => return Err(e),
        };
        Ok(bytes[16] == file_mode && crate::hash::HashMode::from_u8(bytes[17]).is_ok())
    }

    /// Returns the parsed header, running [`update`](Self::update) first
    /// if no cached copy exists.
    pub fn get_data_header(&mut self) -> Result<&DataHeader> {
        if self.header.is_none() {
            self.update()?;
        }
        Ok(self.header.as_ref().expect("update just cached it"))
    }

    /// Deletes the file, consuming the handle.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileNotDeleted`] if the filesystem refuses.
    pub fn delete(self) -> Result<()> {
        std::fs::remove_file(&self.path).map_err(|e| {
            Error::ctx(ErrorKind::FileNotDeleted, format!("{}: {e}", self.path.display()))
        })?;
        log::info!("deleted container file {}", self.path.display());
        Ok(())
    }
}

/// The app-data settings file: one `<setting_name> <value>` pair per
/// line.
#[derive(Debug)]
pub struct AppSettings {
    path: PathBuf,
}

impl AppSettings {
    /// Opens (creating if necessary) the settings file at `path`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileNotCreated`] if the file or its parent directory
    /// cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::ctx(ErrorKind::FileNotCreated, format!("{}: {e}", parent.display()))
                })?;
            }
        }
        if !path.exists() {
            File::create(&path).map_err(|e| {
                Error::ctx(ErrorKind::FileNotCreated, format!("{}: {e}", path.display()))
            })?;
        }
        Ok(Self { path })
    }

    /// Opens the settings file at its default location
    /// (`$HOME/.encvault/appdata`).
    pub fn open_default() -> Result<Self> {
        let home = std::env::var_os("HOME").ok_or_else(|| {
            Error::ctx(ErrorKind::FilePathInvalid, "HOME is not set")
        })?;
        Self::open(PathBuf::from(home).join(".encvault").join("appdata"))
    }

    /// Returns the value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        for line in BufReader::new(File::open(&self.path)?).lines() {
            let line = line?;
            if let Some((key, value)) = line.split_once(' ') {
                if key == name {
                    return Ok(Some(value.to_string()));
                }
            }
        }
        Ok(None)
    }

    /// Stores `value` under `name`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ArgumentInvalid`] if the name contains a space.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        if name.is_empty() || name.contains(' ') {
            return Err(Error::ctx(
                ErrorKind::ArgumentInvalid,
                format!("setting name {name:?}"),
            ));
        }
        let mut lines = self.read_other_lines(name)?;
        lines.push(format!("{name} {value}"));
        self.write_lines(&lines)
    }

    /// Removes the value stored under `name`.
    pub fn remove(&self, name: &str) -> Result<()> {
        let lines = self.read_other_lines(name)?;
        self.write_lines(&lines)
    }

    fn read_other_lines(&self, except: &str) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for line in BufReader::new(File::open(&self.path)?).lines() {
            let line = line?;
            match line.split_once(' ') {
                Some((key, _)) if key == except => {}
                _ if line.is_empty() => {}
                _ => lines.push(line),
            }
        }
        Ok(lines)
    }

    fn write_lines(&self, lines: &[String]) -> Result<()> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        Ok(())
    }
}
