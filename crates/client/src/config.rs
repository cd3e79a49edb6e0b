//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TASKBOARD_API_URL` - Base URL of the REST API (e.g. `http://localhost:8000/api/`)
//!
//! ## Optional
//! - `TASKBOARD_SESSION_FILE` - Where the session token is kept
//!   (default: `<config dir>/taskboard/session.json`)
//! - `TASKBOARD_CORRUPT_TOKEN` - What to do with a token that cannot be
//!   decoded: `purge` (default) or `keep`

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

const SESSION_FILE_NAME: &str = "session.json";
const APP_DIR: &str = "taskboard";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// What the session store does with a persisted token it cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptTokenPolicy {
    /// Remove the token so the next check starts clean.
    #[default]
    Purge,
    /// Leave the token in place; it still reads as logged out.
    Keep,
}

impl FromStr for CorruptTokenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "purge" => Ok(Self::Purge),
            "keep" => Ok(Self::Keep),
            other => Err(format!("expected `purge` or `keep`, got `{other}`")),
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is resolved against. Always ends with `/`.
    pub api_url: Url,
    /// Location of the persisted session token.
    pub session_file: PathBuf,
    /// Handling of undecodable persisted tokens.
    pub corrupt_token: CorruptTokenPolicy,
}

impl ClientConfig {
    /// Build a configuration for `api_url` with default storage settings.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url: normalize_base_url(api_url),
            session_file: default_session_file(),
            corrupt_token: CorruptTokenPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `TASKBOARD_API_URL` is missing or any variable
    /// has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("TASKBOARD_API_URL")?;
        let api_url = parse_api_url(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("TASKBOARD_API_URL".to_string(), e))?;

        let session_file = session_file_from_env();

        let corrupt_token = get_env_or_default("TASKBOARD_CORRUPT_TOKEN", "purge")
            .parse::<CorruptTokenPolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("TASKBOARD_CORRUPT_TOKEN".to_string(), e))?;

        Ok(Self {
            api_url,
            session_file,
            corrupt_token,
        })
    }

    /// Override the session file location.
    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    /// Override the corrupt token policy.
    #[must_use]
    pub const fn with_corrupt_token(mut self, policy: CorruptTokenPolicy) -> Self {
        self.corrupt_token = policy;
        self
    }
}

/// Parse an absolute HTTP(S) base URL, adding a trailing slash if needed.
fn parse_api_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.cannot_be_a_base() {
        return Err("URL cannot be used as a base".to_string());
    }
    Ok(normalize_base_url(url))
}

/// Relative joins replace the last path segment unless the base ends in `/`.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Session file location from `TASKBOARD_SESSION_FILE`, or the per-user
/// default. Unlike [`ClientConfig::from_env`] this needs no API URL, so a
/// session can be ended while the API is unconfigured.
#[must_use]
pub fn session_file_from_env() -> PathBuf {
    let _ = dotenvy::dotenv();
    session_file_or_default(get_optional_env("TASKBOARD_SESSION_FILE"))
}

fn session_file_or_default(configured: Option<String>) -> PathBuf {
    configured.map_or_else(default_session_file, PathBuf::from)
}

fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(SESSION_FILE_NAME)
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
