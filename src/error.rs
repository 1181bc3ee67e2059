//! Error types for encvault operations.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. The error
//! value is a small envelope: an enumerated [`ErrorKind`] plus an optional
//! context string naming the offending field or argument. User-visible
//! messages are produced by one formatter from those two pieces; the core
//! never prints messages itself.
//!
//! Operations that run under a wall-clock budget (password verification,
//! timed chainhashes) can end in a third way besides success and failure:
//! the budget ran out while the answer is still unknown. That outcome is
//! [`Timed::TimedOut`] on the `Ok` path, because a timeout is not a
//! failure, the password may still be correct.
//!
//! ```rust
//! use encvault::{Error, ErrorKind};
//!
//! let err = Error::ctx(ErrorKind::IterationsInvalid, "chainhash1_iters");
//! assert_eq!(err.kind(), ErrorKind::IterationsInvalid);
//! assert!(err.to_string().contains("chainhash1_iters"));
//! ```

/// Enumerated error tags.
///
/// The tag identifies what went wrong; the accompanying context string on
/// [`Error`] identifies where. Matching on the kind is the supported way to
/// branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An internal invariant was violated. These indicate a programming
    /// error, not bad input, and are not recoverable.
    Bug,
    /// A wall-clock budget expired before the operation finished.
    Timeout,
    /// A function argument failed validation.
    ArgumentInvalid,
    /// The file mode byte is outside the valid range.
    FileModeInvalid,
    /// The hash mode byte is outside the valid range.
    HashModeInvalid,
    /// The chainhash mode byte is outside the valid range.
    ChainhashModeInvalid,
    /// A chainhash parameter schema was violated.
    ChainhashFormatInvalid,
    /// A datablock part does not match its schema slot.
    ChainhashDatapartInvalid,
    /// A datablock grew beyond the 255-byte limit.
    ChainhashDatablockOutOfRange,
    /// A part was added to an already complete datablock.
    ChainhashDatablockAlreadyComplete,
    /// The first chainhash (password -> password hash) is invalid.
    Chainhash1Invalid,
    /// The second chainhash (password hash -> validator) is invalid.
    Chainhash2Invalid,
    /// An iteration count is outside `[MIN_ITERATIONS, MAX_ITERATIONS]`.
    IterationsInvalid,
    /// A datablock is missing parts required by its schema.
    DatablockNotComplete,
    /// A datablock exceeds the serializable length.
    DatablockTooLong,
    /// The password contains a character outside the accepted charset.
    PasswordCharInvalid,
    /// The password does not match the stored validator.
    PasswordInvalid,
    /// The password is shorter than the accepted minimum.
    PasswordTooShort,
    /// A byte length precondition was violated.
    LengthInvalid,
    /// An empty file path was given.
    EmptyFilePath,
    /// The file does not carry the `.enc` extension.
    ExtensionInvalid,
    /// The file path is not usable.
    FilePathInvalid,
    /// The file already exists.
    FileExists,
    /// The file does not exist.
    FileNotFound,
    /// The file could not be created.
    FileNotCreated,
    /// The file could not be deleted.
    FileNotDeleted,
    /// The file could not be opened.
    FileNotOpen,
    /// The file is not empty but the operation requires it to be.
    FileNotEmpty,
    /// Reading from the file failed.
    FileRead,
    /// The input ended before a complete value could be read.
    NotEnoughData,
    /// An operation was called out of its required order.
    WrongWorkflow,
    /// An API method was called in a state that does not accept it.
    ApiStateInvalid,
    /// Header settings are missing required values.
    DataHeaderSettingsIncomplete,
    /// A file data struct is missing required values.
    FileDataStructIncomplete,
    /// Decrypted file data does not match its payload schema.
    FileDataInvalid,
}

impl ErrorKind {
    /// Base message for this kind, without context.
    fn message(self) -> &'static str {
        match self {
            Self::Bug => "internal error",
            Self::Timeout => "operation timed out",
            Self::ArgumentInvalid => "invalid argument",
            Self::FileModeInvalid => "invalid file mode",
            Self::HashModeInvalid => "invalid hash mode",
            Self::ChainhashModeInvalid => "invalid chainhash mode",
            Self::ChainhashFormatInvalid => "invalid chainhash format",
            Self::ChainhashDatapartInvalid => "invalid chainhash data part",
            Self::ChainhashDatablockOutOfRange => "chainhash datablock out of range",
            Self::ChainhashDatablockAlreadyComplete => "chainhash datablock is already complete",
            Self::Chainhash1Invalid => "invalid first chainhash",
            Self::Chainhash2Invalid => "invalid second chainhash",
            Self::IterationsInvalid => "invalid iteration count",
            Self::DatablockNotComplete => "datablock is not complete",
            Self::DatablockTooLong => "datablock is too long",
            Self::PasswordCharInvalid => "password contains an invalid character",
            Self::PasswordInvalid => "password is invalid",
            Self::PasswordTooShort => "password is too short",
            Self::LengthInvalid => "invalid length",
            Self::EmptyFilePath => "file path is empty",
            Self::ExtensionInvalid => "invalid file extension",
            Self::FilePathInvalid => "invalid file path",
            Self::FileExists => "file already exists",
            Self::FileNotFound => "file not found",
            Self::FileNotCreated => "file could not be created",
            Self::FileNotDeleted => "file could not be deleted",
            Self::FileNotOpen => "file could not be opened",
            Self::FileNotEmpty => "file is not empty",
            Self::FileRead => "file could not be read",
            Self::NotEnoughData => "not enough data",
            Self::WrongWorkflow => "operation called in the wrong order",
            Self::ApiStateInvalid => "operation is not available in the current state",
            Self::DataHeaderSettingsIncomplete => "data header settings are incomplete",
            Self::FileDataStructIncomplete => "file data struct is incomplete",
            Self::FileDataInvalid => "file data is invalid",
        }
    }
}

/// The single formatter that turns a kind plus context into a message.
fn format_message(kind: ErrorKind, context: Option<&str>) -> String {
    match context {
        Some(ctx) => format!("{} ({ctx})", kind.message()),
        None => kind.message().to_string(),
    }
}

/// The main error type.
///
/// Carries an [`ErrorKind`] and an optional context string naming the
/// offending field or argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", format_message(*.kind, .context.as_deref()))]
pub struct Error {
    kind: ErrorKind,
    context: Option<String>,
}

impl Error {
    /// Creates an error with no context.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Creates an error with a context string naming the offending
    /// field or argument.
    pub fn ctx(kind: ErrorKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: Some(context.into()),
        }
    }

    /// Creates the error returned for a method called in a state that
    /// does not accept it. The context is the method name.
    pub fn api_state(method: &str) -> Self {
        Self::ctx(ErrorKind::ApiStateInvalid, method)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the context string, if any.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns `true` if this error is a wall-clock timeout.
    ///
    /// Timeouts are surfaced distinctly because the operation might have
    /// succeeded with more time, e.g. the password may still be correct.
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    /// Returns `true` if this error is password-related.
    pub fn is_password_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::PasswordInvalid
                | ErrorKind::PasswordCharInvalid
                | ErrorKind::PasswordTooShort
        )
    }

    /// Returns `true` if this error concerns the filesystem.
    pub fn is_file_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::EmptyFilePath
                | ErrorKind::ExtensionInvalid
                | ErrorKind::FilePathInvalid
                | ErrorKind::FileExists
                | ErrorKind::FileNotFound
                | ErrorKind::FileNotCreated
                | ErrorKind::FileNotDeleted
                | ErrorKind::FileNotOpen
                | ErrorKind::FileNotEmpty
                | ErrorKind::FileRead
        )
    }

    /// Returns `true` if this error indicates a violated internal
    /// invariant rather than bad input.
    pub fn is_bug(&self) -> bool {
        self.kind == ErrorKind::Bug
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::ctx(ErrorKind::FileRead, e.to_string())
    }
}

/// A specialized Result type for encvault operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of an operation that runs under a wall-clock budget.
///
/// `Ok(Timed::TimedOut)` means the budget expired before the operation
/// could finish; the state it was inspecting is unchanged and the answer
/// is unknown. Failures are still `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timed<T> {
    /// The operation finished within its budget.
    Done(T),
    /// The budget expired; the result is unknown.
    TimedOut,
}

impl<T> Timed<T> {
    /// Returns `true` for the timed-out outcome.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    /// Unwraps the finished value, panicking on timeout.
    ///
    /// Intended for callers that passed no budget and therefore cannot
    /// time out.
    pub fn expect_done(self, msg: &str) -> T {
        match self {
            Self::Done(v) => v,
            Self::TimedOut => panic!("{msg}"),
        }
    }

    /// Converts to an `Option`, discarding the timeout marker.
    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(v) => Some(v),
            Self::TimedOut => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_without_context() {
        let err = Error::new(ErrorKind::PasswordInvalid);
        assert_eq!(err.to_string(), "password is invalid");
    }

    #[test]
    fn test_message_with_context() {
        let err = Error::ctx(ErrorKind::NotEnoughData, "enc_salt");
        assert_eq!(err.to_string(), "not enough data (enc_salt)");
    }

    #[test]
    fn test_api_state_names_method() {
        let err = Error::api_state("verify_password");
        assert_eq!(err.kind(), ErrorKind::ApiStateInvalid);
        assert_eq!(err.context(), Some("verify_password"));
        assert!(err.to_string().contains("verify_password"));
    }

    #[test]
    fn test_classification() {
        assert!(Error::new(ErrorKind::Timeout).is_timeout());
        assert!(Error::new(ErrorKind::PasswordTooShort).is_password_error());
        assert!(Error::new(ErrorKind::FileNotEmpty).is_file_error());
        assert!(Error::new(ErrorKind::Bug).is_bug());
        assert!(!Error::new(ErrorKind::LengthInvalid).is_file_error());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert_eq!(err.kind(), ErrorKind::FileRead);
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_timed_accessors() {
        let done: Timed<u8> = Timed::Done(7);
        assert!(!done.is_timed_out());
        assert_eq!(done.done(), Some(7));

        let out: Timed<u8> = Timed::TimedOut;
        assert!(out.is_timed_out());
        assert_eq!(out.done(), None);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
