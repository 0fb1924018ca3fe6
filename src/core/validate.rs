//! URL safety checks applied before any load is attempted.
//!
//! Rejected entries are dropped silently by callers; they never reach the
//! error reporter.

use std::sync::LazyLock;

use regex::Regex;

/// Schemes that are never loaded.
pub const DANGEROUS_SCHEMES: [&str; 5] = ["javascript:", "data:", "file:", "ftp:", "blob:"];

static ALLOWED_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+$").expect("static regex")
});

static ABSOLUTE_HTTP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^/?#]+").expect("static regex"));

static PROTOCOL_RELATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^//[^/?#]+").expect("static regex"));

static ANY_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("static regex"));

/// Whether `url` may be handed to a fetcher.
///
/// Accepts absolute `http`/`https` URLs, protocol-relative `//host/...`,
/// root-relative `/...`, `./` and `../` paths, and bare relative paths.
pub fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }

    let lowered = url.to_ascii_lowercase();
    if DANGEROUS_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return false;
    }

    if !ALLOWED_CHARS.is_match(url) {
        return false;
    }

    if ABSOLUTE_HTTP.is_match(url) || PROTOCOL_RELATIVE.is_match(url) {
        return true;
    }
    if url.starts_with("//") {
        return false;
    }
    if url.starts_with('/') || url.starts_with("./") || url.starts_with("../") {
        return true;
    }

    // Bare relative path; any other scheme is refused.
    !ANY_SCHEME.is_match(url)
}

/// Split `urls` into the entries that pass [`is_safe_url`] and a drop count.
pub fn partition_safe(urls: Vec<String>) -> (Vec<String>, usize) {
    let total = urls.len();
    let safe: Vec<String> = urls
        .into_iter()
        .filter(|u| {
            let ok = is_safe_url(u);
            if !ok {
                tracing::debug!(url = %u, "dropping unsafe resource url");
            }
            ok
        })
        .map(|u| u.trim().to_owned())
        .collect();
    let dropped = total - safe.len();
    (safe, dropped)
}
