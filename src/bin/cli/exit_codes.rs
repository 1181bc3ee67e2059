//! Exit codes for the CLI tool.

use encvault::Error;

/// Operation completed.
pub const SUCCESS: i32 = 0;
/// User-visible failure: wrong password, wrong file, I/O trouble.
pub const FAILURE: i32 = 1;
/// The command line itself was invalid (clap uses this code too).
pub const USAGE: i32 = 2;

/// Converts a library error to an exit code.
pub fn error_to_exit_code(error: &Error) -> i32 {
    use encvault::ErrorKind;
    match error.kind() {
        // argument-shaped problems are usage errors
        ErrorKind::ArgumentInvalid
        | ErrorKind::EmptyFilePath
        | ErrorKind::ExtensionInvalid
        | ErrorKind::FilePathInvalid => USAGE,
        _ => FAILURE,
    }
}
