//! Crate-wide limits and defaults.
//!
//! These constants define the accepted parameter ranges for the `.enc`
//! container format. Changing the `MAX_*` bounds changes which files the
//! crate accepts; changing the `STANDARD_*` defaults only changes what new
//! headers are created with.

/// Minimum accepted password length in characters.
pub const MIN_PASS_LEN: usize = 8;

/// Every character a password may contain.
///
/// Sorted by approximate frequency for linear scanning.
pub const VALID_PASS_CHARSET: &str =
    "a1eo0r2ins9lt357864mdycuhkbwgzpfvxjqAWYEZSRXMTNLVBDCOIPHUGKFJQ_.-!*@$#?%&;=~+[(/]{}):§<>,";

/// Highest valid file mode; all modes from 1 to this number are valid.
pub const MAX_FILEMODE_NUMBER: u8 = 1;
/// File mode used when none is requested.
pub const STANDARD_FILEMODE: u8 = 1;

/// Highest valid hash mode; all modes from 1 to this number are valid.
pub const MAX_HASHMODE_NUMBER: u8 = 3;
/// Hash mode used when none is requested (SHA-512).
pub const STANDARD_HASHMODE: u8 = 3;

/// Highest valid chainhash mode; all modes from 1 to this number are valid.
pub const MAX_CHAINHASHMODE_NUMBER: u8 = 5;
/// Chainhash mode used when none is requested (constant + count salt).
pub const STANDARD_CHAINHASHMODE: u8 = 4;

/// Iteration count used when none is requested.
pub const STANDARD_ITERATIONS: u64 = 1000;
/// Minimum accepted chainhash iteration count.
pub const MIN_ITERATIONS: u64 = 1;
/// Maximum accepted chainhash iteration count.
///
/// One billion iterations of SHA-512 takes minutes on current hardware;
/// higher values are rejected so a malicious header cannot stall
/// verification indefinitely.
pub const MAX_ITERATIONS: u64 = 1_000_000_000;

/// File extension for encrypted container files (without the dot).
pub const FILE_EXTENSION: &str = "enc";

/// Environment variable naming the default encryption-files directory.
pub const APP_DIR_ENV: &str = "ENCVAULT_DIR";

/// Byte length of randomly generated constant salts in API-built headers.
pub const RANDOM_SALT_LEN: usize = 16;
