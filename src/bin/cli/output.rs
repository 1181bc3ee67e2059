//! Styled terminal output.

use console::style;
use encvault::PasswordRecord;

/// Prints an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {message}", style("error:").red().bold());
}

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {message}", style("ok:").green().bold());
}

/// Prints an informational message.
pub fn info(message: &str) {
    println!("{message}");
}

/// Prints one stored record. Passwords are masked unless `reveal` is
/// set.
pub fn record(site: &str, record: &PasswordRecord, reveal: bool) {
    println!("{}", style(site).bold());
    if !record.username.is_empty() {
        println!("  username: {}", record.username);
    }
    if !record.email.is_empty() {
        println!("  email:    {}", record.email);
    }
    let shown = if reveal {
        record.password.as_str()
    } else {
        "********"
    };
    println!("  password: {shown}");
}
