//! Project records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{ProjectId, UserId};

/// A project as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "fecha_inicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "fecha_finalizacion")]
    pub end_date: NaiveDate,
    /// Owning user.
    #[serde(rename = "usuario")]
    pub owner: UserId,
}

/// Payload for creating or replacing a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "fecha_inicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "fecha_finalizacion")]
    pub end_date: NaiveDate,
    #[serde(rename = "usuario")]
    pub owner: UserId,
}

impl From<&Project> for ProjectInput {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            start_date: project.start_date,
            end_date: project.end_date,
            owner: project.owner,
        }
    }
}
