//! The caller-facing workflow API.
//!
//! [`Api`] enforces the container workflow as a state machine:
//!
//! ```text
//! INIT -> FILE_SELECTED -> PASSWORD_VERIFIED -> DECRYPTED -> ENCRYPTED
//!   ^                                                            |
//!   +----------------------- logout --------------------------- +
//! ```
//!
//! Each state accepts a disjoint set of operations; calling anything else
//! returns [`ErrorKind::ApiStateInvalid`] with the method name and leaves
//! the state untouched. `logout` is accepted everywhere and zeroizes the
//! stored password hash before returning to `INIT`.
//!
//! Password verification and header creation are the expensive calls
//! (they run both chainhashes); both take an optional millisecond budget
//! and report [`Timed::TimedOut`] without advancing the state when it
//! runs out, the password may still be correct.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use zeroize::Zeroize;

use crate::bytes::Bytes;
use crate::chainhash::{perform_timed, ChainHash, ChainHashData, ChainHashMode, Format};
use crate::crypto::{DecryptBlockChainStream, EncryptBlockChain, Password};
use crate::error::{Error, ErrorKind, Timed};
use crate::filedata::{is_file_mode_valid, FileDataStruct};
use crate::format::DataHeader;
use crate::fs::FileHandle;
use crate::hash::HashMode;
use crate::settings::{
    FILE_EXTENSION, MAX_ITERATIONS, MIN_ITERATIONS, RANDOM_SALT_LEN, STANDARD_FILEMODE,
    STANDARD_ITERATIONS,
};
use crate::{rng, Result};

/// The workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiState {
    /// No file selected.
    Init,
    /// A container file is selected.
    FileSelected,
    /// The password was verified against the selected file.
    PasswordVerified,
    /// The payload is decrypted and editable in memory.
    Decrypted,
    /// Ciphertext is staged and ready to be written.
    Encrypted,
}

/// Header settings with explicit iteration counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSettingsIters {
    /// Payload schema tag.
    pub file_mode: u8,
    /// Hash primitive for the new header.
    pub hash_mode: HashMode,
    /// Mode of the first chainhash (password to password hash).
    pub chainhash1_mode: ChainHashMode,
    /// Iterations of the first chainhash.
    pub chainhash1_iters: u64,
    /// Mode of the second chainhash (password hash to validator).
    pub chainhash2_mode: ChainHashMode,
    /// Iterations of the second chainhash.
    pub chainhash2_iters: u64,
}

impl Default for HeaderSettingsIters {
    fn default() -> Self {
        Self {
            file_mode: STANDARD_FILEMODE,
            hash_mode: HashMode::standard(),
            chainhash1_mode: ChainHashMode::standard(),
            chainhash1_iters: STANDARD_ITERATIONS,
            chainhash2_mode: ChainHashMode::standard(),
            chainhash2_iters: STANDARD_ITERATIONS,
        }
    }
}

impl HeaderSettingsIters {
    fn validate(&self) -> Result<()> {
        if !is_file_mode_valid(self.file_mode) {
            return Err(Error::ctx(
                ErrorKind::FileModeInvalid,
                format!("file mode {}", self.file_mode),
            ));
        }
        for (field, iters) in [
            ("chainhash1_iters", self.chainhash1_iters),
            ("chainhash2_iters", self.chainhash2_iters),
        ] {
            if iters == 0 {
                return Err(Error::ctx(ErrorKind::DataHeaderSettingsIncomplete, field));
            }
            if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&iters) {
                return Err(Error::ctx(ErrorKind::IterationsInvalid, field));
            }
        }
        Ok(())
    }
}

/// Header settings with millisecond budgets: the iteration counts are
/// whatever the machine manages within each budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSettingsTime {
    /// Payload schema tag.
    pub file_mode: u8,
    /// Hash primitive for the new header.
    pub hash_mode: HashMode,
    /// Mode of the first chainhash.
    pub chainhash1_mode: ChainHashMode,
    /// Budget for the first chainhash in milliseconds.
    pub chainhash1_ms: u64,
    /// Mode of the second chainhash.
    pub chainhash2_mode: ChainHashMode,
    /// Budget for the second chainhash in milliseconds.
    pub chainhash2_ms: u64,
}

impl HeaderSettingsTime {
    fn validate(&self) -> Result<()> {
        if !is_file_mode_valid(self.file_mode) {
            return Err(Error::ctx(
                ErrorKind::FileModeInvalid,
                format!("file mode {}", self.file_mode),
            ));
        }
        for (field, ms) in [
            ("chainhash1_ms", self.chainhash1_ms),
            ("chainhash2_ms", self.chainhash2_ms),
        ] {
            if ms == 0 {
                return Err(Error::ctx(ErrorKind::DataHeaderSettingsIncomplete, field));
            }
        }
        Ok(())
    }
}

/// The workflow state machine.
pub struct Api {
    file_mode: u8,
    state: ApiState,
    selected: Option<FileHandle>,
    dh: Option<DataHeader>,
    correct_password_hash: Option<Bytes>,
    file_data: Option<FileDataStruct>,
    encrypted_data: Option<Bytes>,
}

impl Api {
    /// Creates an API working with the given payload schema.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileModeInvalid`] for unknown schema tags.
    pub fn new(file_mode: u8) -> Result<Self> {
        if !is_file_mode_valid(file_mode) {
            return Err(Error::ctx(
                ErrorKind::FileModeInvalid,
                format!("file mode {file_mode}"),
            ));
        }
        Ok(Self {
            file_mode,
            state: ApiState::Init,
            selected: None,
            dh: None,
            correct_password_hash: None,
            file_data: None,
            encrypted_data: None,
        })
    }

    /// Returns the current workflow state.
    pub fn state(&self) -> ApiState {
        self.state
    }

    /// Returns the payload schema this API works with.
    pub fn file_mode(&self) -> u8 {
        self.file_mode
    }

    /// Returns the path of the selected file, if any.
    pub fn selected_path(&self) -> Option<&Path> {
        self.selected.as_ref().map(FileHandle::path)
    }

    /// Deletes all sensitive state and returns to `INIT`.
    ///
    /// Accepted in every state. The stored password hash and plaintext
    /// are zeroized.
    pub fn logout(&mut self) {
        if let Some(mut pwhash) = self.correct_password_hash.take() {
            pwhash.zeroize();
        }
        if let Some(mut file_data) = self.file_data.take() {
            file_data.data.zeroize();
        }
        if let Some(mut encrypted) = self.encrypted_data.take() {
            encrypted.zeroize();
        }
        self.dh = None;
        self.selected = None;
        self.state = ApiState::Init;
        log::debug!("API state changed to INIT (logout)");
    }

    // ------------------------------------------------------------------
    // INIT
    // ------------------------------------------------------------------

    /// Lists the `.enc` files in `dir` that are empty or carry a header
    /// with this API's file mode.
    ///
    /// Only available in `INIT`.
    pub fn get_relevant_file_names(&self, dir: &Path) -> Result<Vec<String>> {
        self.require_state(ApiState::Init, "get_relevant_file_names")?;
        let entries = std::fs::read_dir(dir).map_err(|e| {
            Error::ctx(ErrorKind::FileNotFound, format!("{}: {e}", dir.display()))
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| Error::ctx(ErrorKind::FileRead, e.to_string()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            let Ok(handle) = FileHandle::new(&path) else {
                continue;
            };
            if handle.is_empty()? || handle.is_data_header(self.file_mode)? {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Creates a new empty container file without selecting it.
    ///
    /// Only available in `INIT`.
    pub fn create_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.require_state(ApiState::Init, "create_file")?;
        FileHandle::create(path)?;
        Ok(())
    }

    /// Selects a container file as the working file.
    ///
    /// The file must be empty or carry a valid header with this API's
    /// file mode. Only available in `INIT`; transitions to
    /// `FILE_SELECTED`.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.require_state(ApiState::Init, "select_file")?;
        let mut handle = FileHandle::new(path)?;
        if !handle.is_empty()? {
            let header = handle.get_data_header()?;
            if header.file_mode() != self.file_mode {
                return Err(Error::ctx(
                    ErrorKind::FileModeInvalid,
                    format!(
                        "file stores mode {}, API works with mode {}",
                        header.file_mode(),
                        self.file_mode
                    ),
                ));
            }
        }
        self.selected = Some(handle);
        self.state = ApiState::FileSelected;
        log::debug!("API state changed to FILE_SELECTED");
        Ok(())
    }

    // ------------------------------------------------------------------
    // FILE_SELECTED
    // ------------------------------------------------------------------

    /// Returns whether the selected file is empty.
    ///
    /// Only available in `FILE_SELECTED`.
    pub fn is_file_empty(&self) -> Result<bool> {
        self.require_state(ApiState::FileSelected, "is_file_empty")?;
        self.selected().is_empty()
    }

    /// Unselects the working file and returns to `INIT`.
    pub fn unselect_file(&mut self) -> Result<()> {
        self.require_state(ApiState::FileSelected, "unselect_file")?;
        self.selected = None;
        self.state = ApiState::Init;
        log::debug!("API state changed to INIT (unselect)");
        Ok(())
    }

    /// Deletes the selected file and returns to `INIT`.
    pub fn delete_file(&mut self) -> Result<()> {
        self.require_state(ApiState::FileSelected, "delete_file")?;
        let handle = self.selected.take().expect("state has a selection");
        match handle.delete() {
            Ok(()) => {
                self.state = ApiState::Init;
                log::debug!("API state changed to INIT (delete)");
                Ok(())
            }
            Err(e) => {
                // deletion failed, the selection is gone either way
                self.state = ApiState::Init;
                Err(e)
            }
        }
    }

    /// Returns the raw content of the selected file (header plus
    /// ciphertext).
    ///
    /// Only available in `FILE_SELECTED`.
    pub fn get_file_content(&self) -> Result<Bytes> {
        self.require_state(ApiState::FileSelected, "get_file_content")?;
        let mut reader = self.selected().get_read_stream()?;
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Ok(Bytes::from_slice(&content))
    }

    /// Verifies a password against the selected file's header.
    ///
    /// Runs chainhash 1 over the password and chainhash 2 over the
    /// result, comparing against the stored validator. `timeout_ms`
    /// bounds the combined wall-clock time (0 = unbounded); if it
    /// expires, `Ok(Timed::TimedOut)` is returned and the state stays
    /// `FILE_SELECTED`, the password may still be correct.
    ///
    /// On success the password hash is stored and the state advances to
    /// `PASSWORD_VERIFIED`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::PasswordInvalid`] if the validator does not match;
    /// password policy and header errors pass through. None of these
    /// advance the state.
    pub fn verify_password(&mut self, password: &Password, timeout_ms: u64) -> Result<Timed<Bytes>> {
        self.require_state(ApiState::FileSelected, "verify_password")?;
        password.validate()?;

        let header = self
            .selected
            .as_mut()
            .expect("state has a selection")
            .get_data_header()?
            .clone();
        let hash_mode = header.hash_mode();

        let begin = Instant::now();
        let chainhash1 = header
            .chainhash1()
            .ok_or_else(|| Error::ctx(ErrorKind::Bug, "parsed header without chainhash1"))?;
        let pwhash =
            match chainhash1.perform_with_timeout(hash_mode, password.as_bytes(), timeout_ms)? {
                Timed::Done(h) => h,
                Timed::TimedOut => return Ok(Timed::TimedOut),
            };

        let Some(remaining) = remaining_budget(timeout_ms, &begin) else {
            return Ok(Timed::TimedOut);
        };
        let chainhash2 = header
            .chainhash2()
            .ok_or_else(|| Error::ctx(ErrorKind::Bug, "parsed header without chainhash2"))?;
        let validator =
            match chainhash2.perform_with_timeout(hash_mode, pwhash.as_slice(), remaining)? {
                Timed::Done(v) => v,
                Timed::TimedOut => return Ok(Timed::TimedOut),
            };

        let expected = header
            .valid_passwordhash()
            .ok_or_else(|| Error::ctx(ErrorKind::Bug, "parsed header without validator"))?;
        if &validator != expected {
            return Err(Error::ctx(
                ErrorKind::PasswordInvalid,
                "password does not match the validator",
            ));
        }

        self.correct_password_hash = Some(pwhash.clone());
        self.dh = Some(header);
        self.state = ApiState::PasswordVerified;
        log::debug!("API state changed to PASSWORD_VERIFIED");
        Ok(Timed::Done(pwhash))
    }

    /// Builds a fresh header from explicit iteration counts, randomizing
    /// the chainhash parameters and the master salt.
    ///
    /// Available in `FILE_SELECTED` (only on an empty file, where the
    /// plaintext starts as an empty buffer) and in `DECRYPTED` (to
    /// re-key the current payload with new settings). Transitions to
    /// `DECRYPTED`; on `Ok(Timed::TimedOut)` the state is unchanged.
    pub fn create_data_header(
        &mut self,
        password: &Password,
        settings: &HeaderSettingsIters,
        timeout_ms: u64,
    ) -> Result<Timed<DataHeader>> {
        self.require_header_creation_state("create_data_header")?;
        settings.validate()?;
        password.validate()?;

        let begin = Instant::now();
        let chainhash1 = ChainHash::new(
            settings.chainhash1_mode,
            settings.chainhash1_iters,
            random_datablock(settings.chainhash1_mode)?,
        )?;
        let pwhash = match chainhash1.perform_with_timeout(
            settings.hash_mode,
            password.as_bytes(),
            timeout_ms,
        )? {
            Timed::Done(h) => h,
            Timed::TimedOut => return Ok(Timed::TimedOut),
        };

        let Some(remaining) = remaining_budget(timeout_ms, &begin) else {
            return Ok(Timed::TimedOut);
        };
        let chainhash2 = ChainHash::new(
            settings.chainhash2_mode,
            settings.chainhash2_iters,
            random_datablock(settings.chainhash2_mode)?,
        )?;
        let validator =
            match chainhash2.perform_with_timeout(settings.hash_mode, pwhash.as_slice(), remaining)?
            {
                Timed::Done(v) => v,
                Timed::TimedOut => return Ok(Timed::TimedOut),
            };

        self.install_header(settings.hash_mode, settings.file_mode, chainhash1, chainhash2, validator, pwhash)
    }

    /// Builds a fresh header from millisecond budgets: each chainhash
    /// runs for its budget and the reached iteration counts are stored
    /// in the header.
    ///
    /// Same state rules as [`create_data_header`](Self::create_data_header).
    pub fn create_data_header_timed(
        &mut self,
        password: &Password,
        settings: &HeaderSettingsTime,
    ) -> Result<DataHeader> {
        self.require_header_creation_state("create_data_header_timed")?;
        settings.validate()?;
        password.validate()?;

        let datablock1 = random_datablock(settings.chainhash1_mode)?;
        let (iters1, pwhash) = perform_timed(
            settings.chainhash1_mode,
            datablock1.clone(),
            settings.hash_mode,
            password.as_bytes(),
            settings.chainhash1_ms,
        )?;
        let chainhash1 = ChainHash::new(settings.chainhash1_mode, iters1, datablock1)?;

        let datablock2 = random_datablock(settings.chainhash2_mode)?;
        let (iters2, validator) = perform_timed(
            settings.chainhash2_mode,
            datablock2.clone(),
            settings.hash_mode,
            pwhash.as_slice(),
            settings.chainhash2_ms,
        )?;
        let chainhash2 = ChainHash::new(settings.chainhash2_mode, iters2, datablock2)?;

        log::info!("timed header settled on {iters1}/{iters2} iterations");
        let installed = self.install_header(
            settings.hash_mode,
            settings.file_mode,
            chainhash1,
            chainhash2,
            validator,
            pwhash,
        )?;
        Ok(installed.expect_done("no budget on the install path"))
    }

    // ------------------------------------------------------------------
    // PASSWORD_VERIFIED
    // ------------------------------------------------------------------

    /// Decrypts the selected file's payload.
    ///
    /// Only available in `PASSWORD_VERIFIED`; transitions to
    /// `DECRYPTED`.
    pub fn get_decrypted_data(&mut self) -> Result<FileDataStruct> {
        self.require_state(ApiState::PasswordVerified, "get_decrypted_data")?;
        let header = self.dh.as_ref().expect("state has a header");
        let pwhash = self
            .correct_password_hash
            .as_ref()
            .expect("state has a password hash");
        let enc_salt = header
            .enc_salt()
            .ok_or_else(|| Error::ctx(ErrorKind::Bug, "header without encrypted salt"))?;

        let mut chain = DecryptBlockChainStream::new(header.hash_mode(), pwhash, enc_salt)?;
        let mut reader = self.selected().get_data_stream()?;
        let mut plain = Vec::new();
        chain.process(&mut reader, &mut plain)?;

        let file_data = FileDataStruct::new(header.file_mode(), Bytes::from_slice(&plain))?;
        self.file_data = Some(file_data.clone());
        self.state = ApiState::Decrypted;
        log::debug!("API state changed to DECRYPTED ({}B payload)", plain.len());
        Ok(file_data)
    }

    // ------------------------------------------------------------------
    // DECRYPTED
    // ------------------------------------------------------------------

    /// Returns the in-memory plaintext.
    ///
    /// Only available in `DECRYPTED`.
    pub fn get_file_data(&self) -> Result<FileDataStruct> {
        self.require_state(ApiState::Decrypted, "get_file_data")?;
        self.file_data
            .clone()
            .ok_or_else(|| Error::ctx(ErrorKind::FileDataStructIncomplete, "no plaintext loaded"))
    }

    /// Re-randomizes the master salt, keeping password and settings.
    ///
    /// Cheap: no chainhash is involved. Any staged ciphertext becomes
    /// stale and is dropped. Only available in `DECRYPTED`.
    pub fn change_salt(&mut self) -> Result<()> {
        self.require_state(ApiState::Decrypted, "change_salt")?;
        let pwhash = self
            .correct_password_hash
            .as_ref()
            .expect("state has a password hash")
            .clone();
        let header = self.dh.as_mut().expect("state has a header");
        header.calc_header_bytes(&pwhash, false)?;
        self.encrypted_data = None;
        Ok(())
    }

    /// Encrypts `file_data` under the current header and stages the
    /// ciphertext for writing.
    ///
    /// Only available in `DECRYPTED`; transitions to `ENCRYPTED`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FileModeInvalid`] if the payload belongs to another
    /// schema.
    pub fn get_encrypted_data(&mut self, file_data: &FileDataStruct) -> Result<Bytes> {
        self.require_state(ApiState::Decrypted, "get_encrypted_data")?;
        let header = self.dh.as_ref().expect("state has a header");
        if file_data.file_mode != header.file_mode() {
            return Err(Error::ctx(
                ErrorKind::FileModeInvalid,
                format!(
                    "payload mode {} does not match header mode {}",
                    file_data.file_mode,
                    header.file_mode()
                ),
            ));
        }
        // the header must be serialized before ciphertext can bind to it
        header.header_bytes()?;
        let pwhash = self
            .correct_password_hash
            .as_ref()
            .expect("state has a password hash");
        let enc_salt = header
            .enc_salt()
            .ok_or_else(|| Error::ctx(ErrorKind::Bug, "header without encrypted salt"))?;

        let mut chain = EncryptBlockChain::new(header.hash_mode(), pwhash, enc_salt)?;
        chain.add_data(file_data.data.as_slice())?;
        let encrypted = chain.result();

        self.file_data = Some(file_data.clone());
        self.encrypted_data = Some(encrypted.clone());
        self.state = ApiState::Encrypted;
        log::debug!("API state changed to ENCRYPTED ({}B payload)", encrypted.len());
        Ok(encrypted)
    }

    // ------------------------------------------------------------------
    // ENCRYPTED
    // ------------------------------------------------------------------

    /// Writes header and staged ciphertext to the selected file.
    ///
    /// Only available in `ENCRYPTED`.
    pub fn write_to_file(&mut self) -> Result<()> {
        self.require_state(ApiState::Encrypted, "write_to_file")?;
        let bytes = self.render_file_bytes()?;
        self.selected
            .as_mut()
            .expect("state has a selection")
            .write_bytes(&bytes)
    }

    /// Writes header and staged ciphertext to another file, which must
    /// be new or empty.
    ///
    /// Only available in `ENCRYPTED`.
    pub fn write_to_file_path(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.require_state(ApiState::Encrypted, "write_to_file_path")?;
        let path = path.into();
        let mut handle = if path.exists() {
            FileHandle::new(&path)?
        } else {
            FileHandle::create(&path)?
        };
        let bytes = self.render_file_bytes()?;
        handle.write_bytes_if_empty(&bytes)
    }

    // ------------------------------------------------------------------
    // internal
    // ------------------------------------------------------------------

    fn require_state(&self, wanted: ApiState, method: &str) -> Result<()> {
        if self.state != wanted {
            return Err(Error::api_state(method));
        }
        Ok(())
    }

    fn require_header_creation_state(&self, method: &str) -> Result<()> {
        match self.state {
            ApiState::FileSelected => {
                if !self.selected().is_empty()? {
                    return Err(Error::ctx(
                        ErrorKind::FileNotEmpty,
                        "a fresh header on a non-empty file would orphan its payload",
                    ));
                }
                Ok(())
            }
            ApiState::Decrypted => Ok(()),
            _ => Err(Error::api_state(method)),
        }
    }

    fn selected(&self) -> &FileHandle {
        self.selected.as_ref().expect("state guarantees a selection")
    }

    fn install_header(
        &mut self,
        hash_mode: HashMode,
        file_mode: u8,
        chainhash1: ChainHash,
        chainhash2: ChainHash,
        validator: Bytes,
        pwhash: Bytes,
    ) -> Result<Timed<DataHeader>> {
        let mut header = DataHeader::new(hash_mode);
        header.set_file_mode(file_mode)?;
        header.set_chainhash1(chainhash1)?;
        header.set_chainhash2(chainhash2)?;
        header.set_valid_passwordhash(validator)?;
        header.calc_header_bytes(&pwhash, false)?;

        if self.state == ApiState::FileSelected {
            // fresh container: the plaintext starts empty
            self.file_data = Some(FileDataStruct::new(file_mode, Bytes::new(0))?);
        }
        self.correct_password_hash = Some(pwhash);
        self.dh = Some(header.clone());
        self.encrypted_data = None;
        self.state = ApiState::Decrypted;
        log::debug!("API state changed to DECRYPTED (new header)");
        Ok(Timed::Done(header))
    }

    fn render_file_bytes(&mut self) -> Result<Vec<u8>> {
        let encrypted = self
            .encrypted_data
            .as_ref()
            .ok_or_else(|| Error::ctx(ErrorKind::Bug, "no staged ciphertext"))?;
        let header = self.dh.as_mut().expect("state has a header");
        let total = header.header_size()? + encrypted.len() as u64;
        header.set_file_size(total)?;
        let mut bytes = header.header_bytes()?.to_vec();
        bytes.extend_from_slice(encrypted.as_slice());
        Ok(bytes)
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("state", &self.state)
            .field("file_mode", &self.file_mode)
            .field("selected", &self.selected_path())
            .finish_non_exhaustive()
    }
}

fn remaining_budget(timeout_ms: u64, begin: &Instant) -> Option<u64> {
    if timeout_ms == 0 {
        return Some(0);
    }
    match timeout_ms.checked_sub(begin.elapsed().as_millis() as u64) {
        Some(0) | None => None,
        Some(rest) => Some(rest),
    }
}

/// Generates a randomized parameter block for a chainhash mode:
/// count-salt starts and coefficients are random u64s, constant salts
/// are [`RANDOM_SALT_LEN`] random bytes.
fn random_datablock(mode: ChainHashMode) -> Result<ChainHashData> {
    let mut data = ChainHashData::new(Format::for_mode(mode));
    match mode {
        ChainHashMode::Normal => {}
        ChainHashMode::ConstantSalt => {
            data.add_part(Bytes::random(RANDOM_SALT_LEN)?)?;
        }
        ChainHashMode::CountSalt => {
            data.add_part(Bytes::from_slice(&rng::random_u64()?.to_be_bytes()))?;
        }
        ChainHashMode::ConstantCountSalt => {
            data.add_part(Bytes::from_slice(&rng::random_u64()?.to_be_bytes()))?;
            data.add_part(Bytes::random(RANDOM_SALT_LEN)?)?;
        }
        ChainHashMode::Quadratic => {
            for _ in 0..4 {
                data.add_part(Bytes::from_slice(&rng::random_u64()?.to_be_bytes()))?;
            }
        }
    }
    Ok(data)
}
