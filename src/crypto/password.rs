//! Password handling for container encryption.

use zeroize::Zeroizing;

use crate::error::{Error, ErrorKind};
use crate::settings::{MIN_PASS_LEN, VALID_PASS_CHARSET};
use crate::Result;

/// A password for container encryption/decryption.
///
/// The inner string is zeroized on drop and never shown in debug output.
#[derive(Clone)]
pub struct Password {
    inner: Zeroizing<String>,
}

impl Password {
    /// Creates a new password from a string.
    pub fn new<S: Into<String>>(password: S) -> Self {
        Self {
            inner: Zeroizing::new(password.into()),
        }
    }

    /// Returns the password as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the password bytes fed into the chainhash.
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Returns true if the password is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the length of the password in characters.
    pub fn len(&self) -> usize {
        self.inner.chars().count()
    }

    /// Checks the password against the accepted policy: at least
    /// [`MIN_PASS_LEN`] characters, all drawn from
    /// [`VALID_PASS_CHARSET`].
    ///
    /// The check runs before any expensive chainhash work so obviously
    /// unusable passwords are rejected instantly.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::PasswordCharInvalid`] naming the offending character,
    /// or [`ErrorKind::PasswordTooShort`].
    pub fn validate(&self) -> Result<()> {
        for c in self.inner.chars() {
            if !VALID_PASS_CHARSET.contains(c) {
                return Err(Error::ctx(
                    ErrorKind::PasswordCharInvalid,
                    format!("character {c:?}"),
                ));
            }
        }
        if self.len() < MIN_PASS_LEN {
            return Err(Error::ctx(
                ErrorKind::PasswordTooShort,
                format!("{} of {MIN_PASS_LEN} characters", self.len()),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // don't expose the actual password in debug output
        f.debug_struct("Password")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
