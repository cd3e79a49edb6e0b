//! Project service.

use taskboard_core::{Project, ProjectId, ProjectInput};
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::ClientError;

/// CRUD over `projects/`.
#[derive(Debug, Clone, Copy)]
pub struct ProjectService<'a> {
    api: &'a ApiClient,
}

impl<'a> ProjectService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// List the projects visible to the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Project>, ClientError> {
        self.api.get("projects/").await
    }

    /// Fetch one project.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProjectId) -> Result<Project, ClientError> {
        self.api.get(&format!("projects/{id}/")).await
    }

    /// Create a project. The API only lets administrators do this.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self, project), fields(name = %project.name))]
    pub async fn create(&self, project: &ProjectInput) -> Result<Project, ClientError> {
        self.api.post("projects/", project).await
    }

    /// Replace a project.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self, project))]
    pub async fn update(
        &self,
        id: ProjectId,
        project: &ProjectInput,
    ) -> Result<Project, ClientError> {
        self.api.put(&format!("projects/{id}/"), project).await
    }

    /// Delete a project and, server-side, its tasks.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProjectId) -> Result<(), ClientError> {
        self.api.delete(&format!("projects/{id}/")).await
    }
}
