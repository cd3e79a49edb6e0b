//! User service.

use taskboard_core::{NewUser, RegisterResponse, User, UserId, UserUpdate};
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::ClientError;

/// CRUD over `usuarios/`.
#[derive(Debug, Clone, Copy)]
pub struct UserService<'a> {
    api: &'a ApiClient,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// List users. Non-administrators only see themselves.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, ClientError> {
        self.api.get("usuarios/").await
    }

    /// Fetch one user.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> Result<User, ClientError> {
        self.api.get(&format!("usuarios/{id}/")).await
    }

    /// Fetch the logged-in user's own record.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ClientError> {
        self.api.get("usuarios/me/").await
    }

    /// Create a user.
    ///
    /// The API answers an account creation with a session for the new user;
    /// only the record is kept, so the caller's session is unaffected.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create(&self, user: &NewUser) -> Result<User, ClientError> {
        let response: RegisterResponse = self.api.post("usuarios/", user).await?;
        match response {
            RegisterResponse::Session { user: Some(created), .. }
            | RegisterResponse::Record(created) => Ok(created),
            RegisterResponse::Session { user: None, .. } => Err(
                ClientError::InvalidResponse("user creation returned no user record".to_string()),
            ),
        }
    }

    /// Replace a user's fields.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, ClientError> {
        self.api.put(&format!("usuarios/{id}/"), update).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<(), ClientError> {
        self.api.delete(&format!("usuarios/{id}/")).await
    }
}
