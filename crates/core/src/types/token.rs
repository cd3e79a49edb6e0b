//! Credential claims.
//!
//! The remote API issues JWT-shaped bearer tokens. The client reads the
//! payload segment to learn who is logged in; it never verifies the
//! signature, so the claims drive display affordances only.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::status::Role;

/// Errors that can occur when decoding a token's claims.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The token is not three dot-separated segments.
    #[error("token is not of the form header.payload.signature")]
    Malformed,

    /// The payload segment is not valid base64url.
    #[error("token payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload is not a JSON object with the expected claims.
    #[error("token payload has invalid claims: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Identity claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID. Tokens minted by the stock JWT backend name this `user_id`.
    #[serde(alias = "user_id")]
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Email, when the issuer includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role, when the issuer includes it.
    #[serde(default, rename = "rol", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Expiry (Unix seconds). Informational; never enforced client-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// Expiry as a timestamp, if present and representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Decode the claims of a JWT-shaped token without verifying it.
///
/// Padding on the payload segment is tolerated.
///
/// # Errors
///
/// Returns [`DecodeError`] if the token does not have three segments, the
/// payload is not base64url, or it does not contain the identity claims.
pub fn decode_claims(token: &str) -> Result<TokenClaims, DecodeError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(DecodeError::Malformed);
    };

    if payload.is_empty() {
        return Err(DecodeError::Malformed);
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}
