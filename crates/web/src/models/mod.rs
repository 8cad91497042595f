//! Domain models for Plooma.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod comment;
pub mod project;
pub mod session;
pub mod task;
pub mod user;

pub use comment::{Comment, CommentWithAuthor};
pub use project::{NewProject, Project, ProjectUpdate, ProjectWithOwner};
pub use session::CurrentUser;
pub use task::{AssignedTask, NewTask, Task};
pub use user::User;

/// Shown for a project creator or comment author that no longer resolves.
pub const UNKNOWN: &str = "Unknown";
