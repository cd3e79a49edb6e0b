//! Session store: who is logged in.
//!
//! The persisted token is the only session state. Identity is read back by
//! decoding the token's claims locally; nothing is cached in memory, so a
//! token written or removed by another process is picked up on the next
//! check.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use taskboard_core::{
    Email, LoginRequest, RegisterRequest, RegisterResponse, TokenClaims, TokenPair, User,
    decode_claims,
};
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::config::CorruptTokenPolicy;
use crate::error::ClientError;
use crate::storage::{StorageError, TokenStore};

const LOGIN_PATH: &str = "usuarios/login/";
const REGISTER_PATH: &str = "usuarios/";

/// Result of a registration.
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    /// The API issued a session for the new account; it is now persisted.
    SignedIn {
        claims: TokenClaims,
        user: Option<User>,
    },
    /// The account was created but no session was issued.
    Registered(User),
}

/// Single source of truth for the logged-in identity.
#[derive(Debug, Clone)]
pub struct SessionStore {
    api: ApiClient,
    corrupt_token: CorruptTokenPolicy,
}

impl SessionStore {
    #[must_use]
    pub const fn new(api: ApiClient, corrupt_token: CorruptTokenPolicy) -> Self {
        Self { api, corrupt_token }
    }

    /// The API client sharing this session's token store.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    fn tokens(&self) -> &Arc<dyn TokenStore> {
        self.api.tokens()
    }

    /// Log in and persist the issued token.
    ///
    /// The token is decoded before it is stored; a token that cannot be
    /// decoded is never persisted. On any failure the previous session, if
    /// any, is left as it was.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Auth`] if the API rejects the credentials or cannot
    ///   be reached
    /// - [`ClientError::Decode`] if the issued token is unreadable
    /// - [`ClientError::Storage`] if the token cannot be persisted
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenClaims, ClientError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.expose_secret().to_string(),
        };

        let tokens: TokenPair = self
            .api
            .post_anonymous(LOGIN_PATH, &request)
            .await
            .map_err(|e| match e {
                ClientError::Transport(m) => ClientError::Auth(m),
                other => other.into_auth(),
            })?;

        let claims = self.persist(tokens.token)?;
        info!(user_id = %claims.id, "Logged in");
        Ok(claims)
    }

    /// Create an account.
    ///
    /// When the API signs the new account in, the token is persisted exactly
    /// as [`login`](Self::login) does.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Auth`] if the API rejects the registration, carrying
    ///   its explanation (e.g. a taken username)
    /// - [`ClientError::Transport`] if the API cannot be reached
    /// - [`ClientError::Decode`] if the issued token is unreadable
    /// - [`ClientError::Storage`] if the token cannot be persisted
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<RegisterOutcome, ClientError> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.clone(),
            password: password.expose_secret().to_string(),
        };

        let response: RegisterResponse = self
            .api
            .post_anonymous(REGISTER_PATH, &request)
            .await
            .map_err(ClientError::into_auth)?;

        match response {
            RegisterResponse::Session { tokens, user } => {
                let claims = self.persist(tokens.token)?;
                info!(user_id = %claims.id, "Registered and logged in");
                Ok(RegisterOutcome::SignedIn { claims, user })
            }
            RegisterResponse::Record(user) => {
                info!(user_id = %user.id, "Registered");
                Ok(RegisterOutcome::Registered(user))
            }
        }
    }

    fn persist(&self, token: String) -> Result<TokenClaims, ClientError> {
        let claims = decode_claims(&token)?;
        self.tokens().save(&SecretString::from(token))?;
        Ok(claims)
    }

    /// Forget the session. Always succeeds.
    pub fn logout(&self) {
        end_session(self.tokens().as_ref());
    }

    fn purge_invalid(&self) {
        if self.corrupt_token == CorruptTokenPolicy::Purge
            && let Err(e) = self.tokens().clear()
        {
            warn!(error = %e, "Failed to remove invalid session token");
        }
    }

    /// The identity embedded in the persisted token.
    ///
    /// Returns `None` when no token is stored, when it cannot be read, or
    /// when it cannot be decoded. A token that fails to decode, or a token
    /// file that is not a valid slot file, is removed unless the store was
    /// configured with [`CorruptTokenPolicy::Keep`]. The token's expiry is
    /// not checked.
    #[must_use]
    pub fn current_user(&self) -> Option<TokenClaims> {
        let token = match self.tokens().load() {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, policy = ?self.corrupt_token, "Failed to read session token");
                if matches!(e, StorageError::Format { .. }) {
                    self.purge_invalid();
                }
                return None;
            }
        };

        match decode_claims(token.expose_secret()) {
            Ok(claims) => Some(claims),
            Err(e) => {
                warn!(error = %e, policy = ?self.corrupt_token, "Stored session token is invalid");
                self.purge_invalid();
                None
            }
        }
    }

    /// Whether a decodable token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

/// Clear a persisted session without contacting the API. Always succeeds;
/// storage failures are logged.
pub fn end_session(tokens: &dyn TokenStore) {
    if let Err(e) = tokens.clear() {
        warn!(error = %e, "Failed to clear session token");
    }
    info!("Logged out");
}
