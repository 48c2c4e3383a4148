//! Shared stderr diagnostics.
//!
//! Progress and summaries go to stdout from the callers; everything that
//! signals a skipped file, a skipped line or a suspicious measurement goes
//! through here so the prefixes stay consistent.

/// Format an error string for embedding in an `anyhow` error.
pub fn error_message(msg: impl AsRef<str>) -> String {
    format!("ERROR: {}", msg.as_ref())
}

/// Emit a warning on stderr.
pub fn warn(msg: impl AsRef<str>) {
    eprintln!("WARN: {}", msg.as_ref());
}
