//! Command implementations.
//!
//! Every command writes its result to stdout. Protected commands go
//! through the auth guard first and fail with a redirect to login when no
//! one is logged in.

pub mod alerts;
pub mod auth;
pub mod dashboard;
pub mod projects;
pub mod tasks;
pub mod users;

mod render;

use std::io;
use std::path::Path;
use std::sync::Arc;

use secrecy::SecretString;
use taskboard_client::{
    ApiClient, AuthGuard, ClientConfig, ClientError, ConfigError, FileTokenStore, Navigation,
    NavigationError, SessionStore,
};
use taskboard_core::TokenClaims;
use thiserror::Error;

/// Errors reported to the person running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The API or the session store failed.
    #[error("{}", .0.user_message())]
    Client(#[from] ClientError),

    /// A protected command was run without a session.
    #[error("not logged in (redirected to {0}); run `taskboard login`")]
    NotLoggedIn(&'static str),

    /// The requested dashboard view is not offered to this user.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A command-line value was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Writing output or reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Shared state for one command invocation.
pub struct Context {
    session: SessionStore,
}

impl Context {
    /// Build the session stack from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, CommandError> {
        let tokens = Arc::new(FileTokenStore::new(&config.session_file));
        let api = ApiClient::new(config, tokens)?;
        Ok(Self {
            session: SessionStore::new(api, config.corrupt_token),
        })
    }

    /// Load configuration from the environment and build the session stack,
    /// using `session_file` instead of the configured location when given.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or invalid.
    pub fn from_env(session_file: Option<&Path>) -> Result<Self, CommandError> {
        let mut config = ClientConfig::from_env()?;
        if let Some(path) = session_file {
            config = config.with_session_file(path);
        }
        Self::new(&config)
    }

    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    pub const fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// Require a session, as the guard does for protected screens.
    pub fn require_login(&self) -> Result<TokenClaims, CommandError> {
        AuthGuard::new(&self.session).require().map_err(|nav| match nav {
            Navigation::Redirect(route) | Navigation::Render(route) => {
                CommandError::NotLoggedIn(route.path())
            }
        })
    }
}

/// Use the given password or prompt for one on the terminal without echo.
fn password_or_prompt(password: Option<String>) -> Result<SecretString, CommandError> {
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        return Err(CommandError::InvalidArgument("password cannot be empty".to_string()));
    }
    Ok(SecretString::from(password))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_given_password_is_used() {
        let password = password_or_prompt(Some("s3cret".to_string())).unwrap();
        assert_eq!(password.expose_secret(), "s3cret");
    }

    #[test]
    fn test_empty_password_is_rejected() {
        let err = password_or_prompt(Some(String::new())).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument(_)));
    }
}
