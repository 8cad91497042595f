//! Comment repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use plooma_core::{CommentId, TaskId, UserId};

use super::{RepositoryError, map_missing_reference};
use crate::models::{Comment, CommentWithAuthor};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: CommentId,
    task_id: TaskId,
    user_id: Option<UserId>,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            task_id: row.task_id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentWithAuthorRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_name: Option<String>,
}

impl From<CommentWithAuthorRow> for CommentWithAuthor {
    fn from(row: CommentWithAuthorRow) -> Self {
        Self {
            comment: row.comment.into(),
            author_name: row.author_name,
        }
    }
}

/// Repository for comment database operations.
pub struct CommentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Comments of one task, oldest first, with author names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_task(
        &self,
        task_id: TaskId,
    ) -> Result<Vec<CommentWithAuthor>, RepositoryError> {
        self.list_for_tasks(&[task_id]).await
    }

    /// Comments of several tasks, oldest first, with author names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_tasks(
        &self,
        task_ids: &[TaskId],
    ) -> Result<Vec<CommentWithAuthor>, RepositoryError> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = task_ids.iter().map(TaskId::as_i32).collect();
        let rows = sqlx::query_as::<_, CommentWithAuthorRow>(
            r"
            SELECT c.id, c.task_id, c.user_id, c.content, c.created_at,
                   u.full_name AS author_name
            FROM plooma.comment c
            LEFT JOIN plooma.user u ON u.id = c.user_id
            WHERE c.task_id = ANY($1)
            ORDER BY c.created_at, c.id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentWithAuthor::from).collect())
    }

    /// Append a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        task_id: TaskId,
        user_id: UserId,
        content: &str,
    ) -> Result<Comment, RepositoryError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r"
            INSERT INTO plooma.comment (task_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, content, created_at
            ",
        )
        .bind(task_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(self.pool)
        .await
        .map_err(map_missing_reference)?;

        Ok(row.into())
    }
}
