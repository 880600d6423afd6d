//! URL canonicalization for duplicate detection.
//!
//! Two strategies:
//!
//! - [`NormalizeMode::Strict`] re-serializes the parsed URL. Only default ports,
//!   case in scheme/host and percent-encoding differences collapse.
//! - [`NormalizeMode::Loose`] (the default) keeps `host + path + query` with a
//!   leading `www.` and one trailing slash removed. `http` and `https` variants,
//!   ports and fragments collapse.
//!
//! Unparseable input comes back unchanged. Both modes are idempotent: the
//! loose form never parses as an absolute URL again, and the strict form is
//! already canonical.

use reqwest::Url;

use crate::types::settings::NormalizeMode;

/// Canonical form of `url` under `mode`.
pub fn normalize(url: &str, mode: NormalizeMode) -> String {
    match mode {
        NormalizeMode::Strict => normalize_strict(url),
        NormalizeMode::Loose => normalize_loose(url),
    }
}

fn normalize_strict(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => url.to_string(),
    }
}

fn normalize_loose(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };
    // mailto:, data:, file:/// and friends have no host to key on.
    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return url.to_string(),
    };

    let host = host.strip_prefix("www.").unwrap_or(host);
    let path = parsed.path();
    let path = path.strip_suffix('/').unwrap_or(path);

    let mut out = String::with_capacity(host.len() + path.len() + 16);
    out.push_str(host);
    out.push_str(path);
    if let Some(query) = parsed.query() {
        out.push('?');
        out.push_str(query);
    }
    out
}

/// Host of `url` without a leading `www.`, if it has one.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}
