//! Resource services.
//!
//! Each service maps one CRUD verb to one API call and returns typed
//! records. Errors are returned as-is: nothing is retried, cached or
//! reconciled here.
//!
//! # Services
//!
//! - `users` - Accounts, including the logged-in user's own record
//! - `projects` - Projects
//! - `tasks` - Tasks, grouped by project when listed
//! - `alerts` - Notification inbox

pub mod alerts;
pub mod projects;
pub mod tasks;
pub mod users;

pub use alerts::AlertService;
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use users::UserService;
