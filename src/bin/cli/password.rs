//! Password prompts.

use encvault::{Error, ErrorKind, Password, Result};

/// Prompts for an existing password.
pub fn prompt(prompt: &str) -> Result<Password> {
    let raw = rpassword::prompt_password(format!("{prompt}: "))
        .map_err(|e| Error::ctx(ErrorKind::ArgumentInvalid, format!("password prompt: {e}")))?;
    Ok(Password::new(raw))
}

/// Prompts for a new password: asks twice, enforces the policy.
pub fn prompt_new() -> Result<Password> {
    let password = prompt("New password")?;
    password.validate()?;
    let repeat = prompt("Repeat password")?;
    if password.as_str() != repeat.as_str() {
        return Err(Error::ctx(
            ErrorKind::PasswordInvalid,
            "the two entries do not match",
        ));
    }
    Ok(password)
}

/// Prompts for a free-form field value (visible input).
pub fn prompt_field(name: &str) -> Result<String> {
    use std::io::Write;
    print!("{name}: ");
    std::io::stdout()
        .flush()
        .map_err(|e| Error::ctx(ErrorKind::ArgumentInvalid, e.to_string()))?;
    let mut value = String::new();
    std::io::stdin()
        .read_line(&mut value)
        .map_err(|e| Error::ctx(ErrorKind::ArgumentInvalid, e.to_string()))?;
    Ok(value.trim_end_matches(['\r', '\n']).to_string())
}
