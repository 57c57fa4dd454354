//! Bearer token expiry inspection.
//!
//! The session store checks expiry locally by decoding the JWT payload
//! segment; no network call is involved. This is advisory enforcement
//! only - the server still rejects expired tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    /// Expiry as seconds since the Unix epoch.
    exp: Option<i64>,
}

/// Decode the expiry claim from a JWT.
///
/// Returns `None` when the token is malformed or carries no expiry claim.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// Whether the token should be treated as expired.
///
/// Undecodable tokens and tokens without an expiry claim count as expired.
pub fn is_expired(token: &str) -> bool {
    match expires_at(token) {
        Some(expiry) => expiry <= Utc::now(),
        None => true,
    }
}
