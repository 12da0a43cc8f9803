//! Console output helpers shared by the download and extraction flows.
//!
//! Progress text is written to an injected writer so the flows can be
//! exercised against an in-memory buffer. Diagnostics use the `log` facade
//! and are routed to standard error by [`init_logging`].

use std::fmt::Display;
use std::io::Write;

use crate::error::Result;

/// Write a single line of progress output.
///
/// Output is best-effort: a failed write (for example a closed pipe) is
/// ignored so reporting never aborts a download or extraction.
pub fn write_line(out: &mut dyn Write, message: impl Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Map a run result to a process exit code.
///
/// An error is printed to `stderr` as `Error: <message>` and yields 1;
/// success yields 0.
#[must_use]
pub fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_line(stderr, format_args!("Error: {err}"));
            1
        }
    }
}

/// Install the `env_logger` backend for the `log` facade.
///
/// Diagnostics go to standard error at `warn` and above unless `RUST_LOG`
/// selects another filter. Repeated calls are ignored.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        // A logger is already installed.
    }
}

/// Format a byte count with comma thousands separators.
///
/// # Examples
///
/// ```
/// use javonet_installer::output::format_bytes;
///
/// assert_eq!(format_bytes(999), "999");
/// assert_eq!(format_bytes(1_048_576), "1,048,576");
/// ```
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Format a count with the singular or plural noun.
#[must_use]
pub fn pluralise(count: usize, singular: &str, plural: &str) -> String {
    let noun = if count == 1 { singular } else { plural };
    format!("{count} {noun}")
}
