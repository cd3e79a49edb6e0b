//! Task records.
//!
//! `GET tasks/` returns tasks grouped under their project rather than a flat
//! list; [`ProjectTasks`] models one such group.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::project::Project;
use crate::types::{ProjectId, TaskId, TaskStatus, UserId};

/// A task as returned by `GET tasks/{id}/` and the write endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "estado", default)]
    pub status: TaskStatus,
    #[serde(rename = "proyecto")]
    pub project: ProjectId,
    #[serde(rename = "asignada_a")]
    pub assignee: UserId,
}

/// A task inside a grouped listing; the project is implied by the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: TaskId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "estado", default)]
    pub status: TaskStatus,
    #[serde(rename = "asignada_a")]
    pub assignee: UserId,
}

/// One project with the tasks visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTasks {
    pub id: ProjectId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "fecha_inicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "fecha_finalizacion")]
    pub end_date: NaiveDate,
    #[serde(rename = "usuario")]
    pub owner: UserId,
    #[serde(rename = "tareas", default)]
    pub tasks: Vec<TaskSummary>,
}

impl ProjectTasks {
    /// The group's project header.
    #[must_use]
    pub fn project(&self) -> Project {
        Project {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            owner: self.owner,
        }
    }

    /// The group's tasks as full records.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .map(|t| Task {
                id: t.id,
                name: t.name.clone(),
                description: t.description.clone(),
                status: t.status,
                project: self.id,
                assignee: t.assignee,
            })
            .collect()
    }

    /// Flatten a grouped listing into full task records.
    #[must_use]
    pub fn flatten(groups: &[Self]) -> Vec<Task> {
        groups.iter().flat_map(Self::tasks).collect()
    }
}

/// Payload for `POST tasks/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "estado")]
    pub status: TaskStatus,
    #[serde(rename = "proyecto")]
    pub project: ProjectId,
    #[serde(rename = "asignada_a")]
    pub assignee: UserId,
}

/// Payload for `PUT tasks/{id}/`.
///
/// Omitted fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "estado", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(rename = "asignada_a", default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,
}

impl TaskUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.assignee.is_none()
    }
}

/// Payload for `PATCH tasks/{id}/` changing only the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(rename = "estado")]
    pub status: TaskStatus,
}
