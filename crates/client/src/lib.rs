//! Taskboard Client - session, authorization and API access.
//!
//! # Architecture
//!
//! Control flows leaf-first:
//!
//! ```text
//! SessionStore -> AuthGuard -> DashboardController -> services -> ApiClient -> REST API
//! ```
//!
//! - [`storage`] - Where the session token is persisted
//! - [`api`] - HTTP client attaching the bearer token to every request
//! - [`session`] - Login, registration, logout and the current identity
//! - [`guard`] - Route gating on session presence
//! - [`services`] - Typed CRUD over users, projects, tasks and alerts
//! - [`dashboard`] - Post-login shell: role-based navigation and the alert inbox
//! - [`cancel`] - Cancellation scope for the active view's fetches
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use secrecy::SecretString;
//! use taskboard_client::{ApiClient, ClientConfig, FileTokenStore, SessionStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let tokens = Arc::new(FileTokenStore::new(&config.session_file));
//! let api = ApiClient::new(&config, tokens)?;
//! let session = SessionStore::new(api, config.corrupt_token);
//!
//! let me = session.login("ana", &SecretString::from("hunter2")).await?;
//! println!("logged in as {}", me.username);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cancel;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod services;
pub mod session;
pub mod storage;

pub use api::ApiClient;
pub use cancel::ViewScope;
pub use config::{ClientConfig, ConfigError, CorruptTokenPolicy, session_file_from_env};
pub use dashboard::{
    ActiveView, DashboardController, NavEntry, NavigationError, ViewData, ViewRequest,
};
pub use error::ClientError;
pub use guard::{AuthGuard, AuthState, Navigation, Route};
pub use services::{AlertService, ProjectService, TaskService, UserService};
pub use session::{RegisterOutcome, SessionStore, end_session};
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TOKEN_KEY, TokenStore};
