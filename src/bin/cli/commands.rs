//! Command implementations.

use std::path::PathBuf;

use encvault::{
    Api, AppSettings, ChainHashMode, Error, ErrorKind, FileDataStruct, HashMode,
    HeaderSettingsIters, HeaderSettingsTime, PasswordData, PasswordRecord, Result,
    settings::STANDARD_ITERATIONS,
};

use crate::output;
use crate::password;

/// Shared command context: the working directory and verbosity.
pub struct Context {
    dir: PathBuf,
    quiet: bool,
}

impl Context {
    /// Resolves the working directory: the `--dir` flag (or
    /// `ENCVAULT_DIR`), then the remembered directory from the app-data
    /// file, then the current directory. A successfully used directory
    /// is remembered for the next run.
    pub fn new(dir: Option<PathBuf>, quiet: bool) -> Self {
        let dir = dir
            .or_else(|| {
                AppSettings::open_default()
                    .ok()
                    .and_then(|s| s.get("filePath").ok().flatten())
                    .map(PathBuf::from)
                    .filter(|p| p.is_dir())
            })
            .unwrap_or_else(|| PathBuf::from("."));
        Self { dir, quiet }
    }

    fn file_path(&self, file: &str) -> PathBuf {
        // bare names get the extension appended for convenience
        let mut name = file.to_string();
        if !name.ends_with(".enc") {
            name.push_str(".enc");
        }
        self.dir.join(name)
    }

    fn remember_dir(&self) {
        if let Ok(settings) = AppSettings::open_default() {
            let _ = settings.set("filePath", &self.dir.display().to_string());
        }
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            output::info(message);
        }
    }
}

/// Lists the container files in the working directory.
pub fn list(ctx: &Context) -> Result<()> {
    let api = Api::new(1)?;
    let names = api.get_relevant_file_names(&ctx.dir)?;
    if names.is_empty() {
        ctx.info("no container files found");
    }
    for name in names {
        output::info(&name);
    }
    ctx.remember_dir();
    Ok(())
}

/// Creates a new empty container file.
pub fn create(ctx: &Context, file: &str) -> Result<()> {
    let api = Api::new(1)?;
    let path = ctx.file_path(file);
    api.create_file(&path)?;
    output::success(&format!("created {}", path.display()));
    ctx.remember_dir();
    Ok(())
}

/// Writes a fresh header (and an empty payload) onto an empty container.
pub fn init(
    ctx: &Context,
    file: &str,
    hash_mode: u8,
    chainhash_mode: u8,
    iterations: Option<u64>,
    budget_ms: Option<u64>,
) -> Result<()> {
    let hash_mode = HashMode::from_u8(hash_mode)?;
    let chainhash_mode = ChainHashMode::from_u8(chainhash_mode)?;
    let pw = password::prompt_new()?;

    let mut api = Api::new(1)?;
    api.select_file(ctx.file_path(file))?;
    match (iterations, budget_ms) {
        (_, Some(ms)) => {
            let settings = HeaderSettingsTime {
                file_mode: 1,
                hash_mode,
                chainhash1_mode: chainhash_mode,
                chainhash1_ms: ms,
                chainhash2_mode: chainhash_mode,
                chainhash2_ms: ms,
            };
            let header = api.create_data_header_timed(&pw, &settings)?;
            ctx.info(&format!(
                "budget of {ms}ms per chainhash gave {}/{} iterations",
                header.chainhash1().map(|c| c.iters()).unwrap_or(0),
                header.chainhash2().map(|c| c.iters()).unwrap_or(0),
            ));
        }
        (iters, None) => {
            let iters = iters.unwrap_or(STANDARD_ITERATIONS);
            let settings = HeaderSettingsIters {
                file_mode: 1,
                hash_mode,
                chainhash1_mode: chainhash_mode,
                chainhash1_iters: iters,
                chainhash2_mode: chainhash_mode,
                chainhash2_iters: iters,
            };
            api.create_data_header(&pw, &settings, 0)?;
        }
    }

    // persist the header with an empty record set
    let empty = PasswordData::new().to_file_data()?;
    api.get_encrypted_data(&empty)?;
    api.write_to_file()?;
    output::success(&format!("initialized {file}"));
    ctx.remember_dir();
    Ok(())
}

/// Decrypts a container and prints its records.
pub fn show(ctx: &Context, file: &str, site: Option<&str>, reveal: bool) -> Result<()> {
    let (_, records) = open_records(ctx, file)?;
    match site {
        Some(site) => {
            let record = records.get(site).ok_or_else(|| {
                Error::ctx(ErrorKind::FileDataInvalid, format!("no record for {site}"))
            })?;
            output::record(site, record, reveal);
        }
        None => {
            if records.is_empty() {
                ctx.info("no records stored");
            }
            for (site, record) in records.iter() {
                output::record(site, record, reveal);
            }
        }
    }
    ctx.remember_dir();
    Ok(())
}

/// Adds or updates one record.
pub fn set(ctx: &Context, file: &str, site: &str) -> Result<()> {
    let (mut api, mut records) = open_records(ctx, file)?;
    let record = PasswordRecord {
        username: password::prompt_field("username")?,
        email: password::prompt_field("email")?,
        password: password::prompt("password for the record")?.as_str().to_string(),
    };
    records.set(site, record)?;
    write_records(&mut api, &records)?;
    output::success(&format!("stored record for {site}"));
    ctx.remember_dir();
    Ok(())
}

/// Removes one record.
pub fn remove(ctx: &Context, file: &str, site: &str) -> Result<()> {
    let (mut api, mut records) = open_records(ctx, file)?;
    if !records.remove(site) {
        return Err(Error::ctx(
            ErrorKind::FileDataInvalid,
            format!("no record for {site}"),
        ));
    }
    write_records(&mut api, &records)?;
    output::success(&format!("removed record for {site}"));
    ctx.remember_dir();
    Ok(())
}

/// Deletes a container file.
pub fn destroy(ctx: &Context, file: &str, force: bool) -> Result<()> {
    if !force {
        let answer = password::prompt_field(&format!("really delete {file}? (y/n)"))?;
        if answer != "y" {
            ctx.info("aborted");
            return Ok(());
        }
    }
    let mut api = Api::new(1)?;
    api.select_file(ctx.file_path(file))?;
    api.delete_file()?;
    output::success(&format!("deleted {file}"));
    Ok(())
}

/// Selects, verifies and decrypts a container, returning the API (in
/// the DECRYPTED state) and the parsed records.
fn open_records(ctx: &Context, file: &str) -> Result<(Api, PasswordData)> {
    let pw = password::prompt("Password")?;
    let mut api = Api::new(1)?;
    api.select_file(ctx.file_path(file))?;
    api.verify_password(&pw, 0)?;
    let file_data = api.get_decrypted_data()?;
    let records = PasswordData::from_file_data(&file_data)?;
    Ok((api, records))
}

/// Encrypts the records and writes them back to the selected file.
fn write_records(api: &mut Api, records: &PasswordData) -> Result<()> {
    let file_data: FileDataStruct = records.to_file_data()?;
    api.get_encrypted_data(&file_data)?;
    api.write_to_file()
}
