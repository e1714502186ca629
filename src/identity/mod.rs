//! Client identity resolution.
//!
//! A client announces itself to the server with a self-chosen name that has
//! to be unique among the clients polling the same server. Callers may pick
//! one; otherwise it is derived from the host name, a small random number and
//! the current time.

use chrono::Utc;
use rand::Rng;

/// Used when the host name cannot be determined.
pub const FALLBACK_HOST: &str = "unknown-host";

/// Returns `supplied` unchanged when non-empty, otherwise generates
/// `{host}-{0..99}-{epoch millis}`. Never fails.
pub fn resolve_name(supplied: &str) -> String {
    if !supplied.is_empty() {
        return supplied.to_string();
    }
    let nonce: u8 = rand::thread_rng().gen_range(0..100);
    format!(
        "{}-{}-{}",
        hostname_or_fallback(),
        nonce,
        Utc::now().timestamp_millis()
    )
}

/// Host name as reported by the operating system, or [`FALLBACK_HOST`] when
/// it is unavailable or not valid UTF-8.
pub fn hostname_or_fallback() -> String {
    host_label(gethostname::gethostname().into_string().ok())
}

/// Trims a looked-up host name, substituting [`FALLBACK_HOST`] for a missing
/// or blank one.
pub(crate) fn host_label(raw: Option<String>) -> String {
    raw.as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_HOST.to_string())
}
