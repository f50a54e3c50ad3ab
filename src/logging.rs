//! Structured Logging with Sensitive Data Redaction
//!
//! Tracing setup for the binary, plus helpers that shorten addresses and
//! hashes before they reach a log line. Keys are never logged.

use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `typed_pay=debug` with `verbose`
/// and `typed_pay=info` without. A second call is a no-op.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "typed_pay=debug"
    } else {
        "typed_pay=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Fully redact a sensitive value
pub fn redact_value(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }

    if value.len() <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", value.len())
    }
}

/// Partially redact an address (show 0x plus 4 chars, and the last 4)
pub fn redact_address(address: &str) -> String {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    if !trimmed.is_ascii() || trimmed.len() <= 12 {
        return redact_value(trimmed);
    }

    let prefix_len = if trimmed.starts_with("0x") { 6 } else { 4 };
    let suffix = &trimmed[trimmed.len() - 4..];

    format!("{}…{}", &trimmed[..prefix_len], suffix)
}

/// Partially redact a hash or signature (show first 10 and last 6 chars)
pub fn redact_hex(value: &str) -> String {
    let trimmed = value.trim();

    if !trimmed.is_ascii() || trimmed.len() <= 20 {
        return trimmed.to_string();
    }

    let prefix_len = if trimmed.starts_with("0x") { 12 } else { 10 };
    let suffix = &trimmed[trimmed.len() - 6..];

    format!("{}…{}", &trimmed[..prefix_len], suffix)
}
