//! Comment domain types.

use chrono::{DateTime, Utc};

use plooma_core::{CommentId, TaskId, UserId};

use super::UNKNOWN;

/// A task comment (domain type). Comments are append-only.
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    /// Author; cleared when the author is deleted.
    pub user_id: Option<UserId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment joined with its author's name.
#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author_name: Option<String>,
}

impl CommentWithAuthor {
    /// Author name, falling back to "Unknown".
    #[must_use]
    pub fn author(&self) -> &str {
        match self.author_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN,
        }
    }
}
