//! Role and status enums shared by records and the session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse authorization tag carried by a user.
///
/// The remote API knows `"admin"` and its default `"usuario"`; any other
/// value is preserved so that updating a user never rewrites its role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Full access, including user management.
    Admin,
    /// The server's default role for registered users.
    User,
    /// A role this client does not know about.
    Other(String),
}

impl Role {
    /// Wire value of the administrator role.
    pub const ADMIN: &'static str = "admin";
    /// Wire value of the default role.
    pub const USER: &'static str = "usuario";

    /// Whether this role grants administrator affordances.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// The wire representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => Self::ADMIN,
            Self::User => Self::USER,
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            Self::ADMIN => Self::Admin,
            Self::USER => Self::User,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(s) => s,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Whether an optional role grants administrator affordances.
#[must_use]
pub fn is_admin(role: Option<&Role>) -> bool {
    role.is_some_and(Role::is_admin)
}

/// Task progress.
///
/// Serialized with the remote API's values; the English spellings are
/// accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pendiente", alias = "pending")]
    Pending,
    #[serde(rename = "en_progreso", alias = "in_progress", alias = "en desarrollo")]
    InProgress,
    #[serde(rename = "completada", alias = "completed")]
    Completed,
}

impl TaskStatus {
    /// All statuses, in workflow order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// The value sent to the remote API.
    #[must_use]
    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::InProgress => "en_progreso",
            Self::Completed => "completada",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        })
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" | "pendiente" => Ok(Self::Pending),
            "in_progress" | "en_progreso" => Ok(Self::InProgress),
            "completed" | "completada" => Ok(Self::Completed),
            _ => Err(format!("invalid task status: {s}")),
        }
    }
}
