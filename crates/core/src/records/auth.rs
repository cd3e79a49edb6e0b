//! Login and registration payloads.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::user::User;
use crate::types::Email;

/// Body of `POST usuarios/login/`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of a self-service `POST usuarios/`.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: Email,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Tokens returned by a successful login.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token sent as the bearer credential.
    pub token: String,
    /// Refresh token. The client does not use it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &"[REDACTED]")
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Response to `POST usuarios/`.
///
/// Self-registration signs the new user in; some deployments only echo the
/// created record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RegisterResponse {
    /// A session was issued for the new account.
    Session {
        #[serde(flatten)]
        tokens: TokenPair,
        #[serde(default)]
        user: Option<User>,
    },
    /// Only the created record was returned.
    Record(User),
}
