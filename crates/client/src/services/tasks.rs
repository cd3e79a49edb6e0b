//! Task service.

use taskboard_core::{
    NewTask, ProjectId, ProjectTasks, StatusChange, Task, TaskId, TaskStatus, TaskUpdate,
};
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::ClientError;

/// CRUD over `tasks/`.
#[derive(Debug, Clone, Copy)]
pub struct TaskService<'a> {
    api: &'a ApiClient,
}

impl<'a> TaskService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// List visible tasks grouped by project.
    ///
    /// Use [`ProjectTasks::flatten`] for a flat list.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ProjectTasks>, ClientError> {
        self.api.get("tasks/").await
    }

    /// List visible tasks of one project.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn list_for_project(&self, project: ProjectId) -> Result<Vec<Task>, ClientError> {
        let project = project.to_string();
        self.api
            .get_with_query("tasks/filter_by_project/", &[("project_id", project.as_str())])
            .await
    }

    /// Fetch one task.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn get(&self, id: TaskId) -> Result<Task, ClientError> {
        self.api.get(&format!("tasks/{id}/")).await
    }

    /// Create a task.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self, task), fields(name = %task.name, project = %task.project))]
    pub async fn create(&self, task: &NewTask) -> Result<Task, ClientError> {
        self.api.post("tasks/", task).await
    }

    /// Update a task's fields.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: TaskId, update: &TaskUpdate) -> Result<Task, ClientError> {
        self.api.put(&format!("tasks/{id}/"), update).await
    }

    /// Change only a task's status. Assignees may do this on tasks they
    /// cannot otherwise edit.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, ClientError> {
        self.api
            .patch(&format!("tasks/{id}/"), &StatusChange { status })
            .await
    }

    /// Delete a task.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: TaskId) -> Result<(), ClientError> {
        self.api.delete(&format!("tasks/{id}/")).await
    }
}
