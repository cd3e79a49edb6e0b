//! Error taxonomy for the client.

use reqwest::StatusCode;
use taskboard_core::DecodeError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Errors returned by the session store, services and dashboard.
///
/// Service calls hand these back unmodified; reporting them is up to the
/// caller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Login or registration was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API could not be reached or failed on its side.
    #[error("transport error: {0}")]
    Transport(String),

    /// The API rejected the request.
    #[error("{message} (HTTP {status})")]
    Validation {
        /// HTTP status code.
        status: u16,
        /// Server-provided text.
        message: String,
    },

    /// The API requires a valid session.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The session is valid but not allowed to do this.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A success response whose body did not match the expected shape.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// A token could not be decoded.
    #[error("invalid session token: {0}")]
    Decode(#[from] DecodeError),

    /// The token store failed.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),

    /// The view that requested this result is no longer active.
    #[error("request cancelled")]
    Cancelled,

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Classify a non-success response.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = server_message(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            s if s.is_client_error() => Self::Validation {
                status: s.as_u16(),
                message,
            },
            s => Self::Transport(format!("server returned {s}: {message}")),
        }
    }

    /// HTTP status of an API rejection, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::Validation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing to the person at the keyboard.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(m) | Self::Unauthorized(m) | Self::Forbidden(m) => m.clone(),
            Self::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Reclassify an API rejection of credentials as an authentication failure.
    pub(crate) fn into_auth(self) -> Self {
        match self {
            Self::Unauthorized(m) | Self::Forbidden(m) | Self::Validation { message: m, .. } => {
                Self::Auth(m)
            }
            other => other,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::Transport(format!("could not reach the server: {e}"))
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Extract readable text from an error body.
///
/// Understands `{"detail": "..."}`, field error objects such as
/// `{"username": ["already exists"]}`, and bare lists of strings.
fn server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Some(body.to_string());
    };

    match &value {
        serde_json::Value::Object(map) => {
            if let Some(detail) = map.get("detail").and_then(flatten_messages) {
                return Some(detail);
            }
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(field, v)| {
                    flatten_messages(v).map(|msg| {
                        if field == "non_field_errors" {
                            msg
                        } else {
                            format!("{field}: {msg}")
                        }
                    })
                })
                .collect();
            if parts.is_empty() {
                Some(body.to_string())
            } else {
                Some(parts.join("; "))
            }
        }
        other => flatten_messages(other).or_else(|| Some(body.to_string())),
    }
}

fn flatten_messages(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_messages).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}
