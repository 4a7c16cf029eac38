//! Shared helpers for request handling and input validation.

use axum::http::HeaderMap;

use crate::error::{AppError, Result};

/// RFC 5321 limit on a forward path.
const MAX_EMAIL_LEN: usize = 254;

/// Client IP recorded on activations and verification log entries.
///
/// Tries `x-forwarded-for` first (for proxied requests), then `x-real-ip`.
/// Only the first hop of a forwarded chain is kept.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Shorten a license key for logs: prefix and first group only.
pub fn mask_key(key: &str) -> String {
    let mut groups = key.splitn(3, '-');
    match (groups.next(), groups.next()) {
        (Some(prefix), Some(first)) => format!("{}-{}-****", prefix, first),
        _ => "****".to_string(),
    }
}

/// Trim a required string field and bound its length.
pub fn require_field<'a>(name: &str, value: &'a str, max_len: usize) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", name)));
    }
    if value.len() > max_len {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most {} characters",
            name, max_len
        )));
    }
    Ok(value)
}

/// Minimal shape check for an email address: `local@domain` with a dot in the
/// domain and no whitespace.
pub fn validate_email(email: &str) -> Result<&str> {
    let email = require_field("email", email, MAX_EMAIL_LEN)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(AppError::InvalidInput("Invalid email address".into()))
    }
}
