//! Records mirrored from the remote API and the payloads sent to it.
//!
//! Field names on the wire are the API's (`nombre`, `descripcion`, ...);
//! the Rust names are English.

pub mod alert;
pub mod auth;
pub mod project;
pub mod task;
pub mod user;

pub use alert::{Alert, AlertUpdate, NewAlert, VisibilityUpdate};
pub use auth::{LoginRequest, RegisterRequest, RegisterResponse, TokenPair};
pub use project::{Project, ProjectInput};
pub use task::{NewTask, ProjectTasks, StatusChange, Task, TaskSummary, TaskUpdate};
pub use user::{NewUser, User, UserUpdate};
