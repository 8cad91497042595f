//! Task repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use plooma_core::{ProjectId, TaskCategory, TaskId, TaskPriority, TaskStatus, UserId};

use super::{RepositoryError, map_missing_reference};
use crate::models::{AssignedTask, NewTask, Task};

const TASK_COLUMNS: &str = "id, project_id, title, description, status, assigned_to, due_date, \
                            priority, category, position, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: TaskId,
    project_id: ProjectId,
    title: String,
    description: String,
    status: TaskStatus,
    assigned_to: Option<UserId>,
    due_date: Option<NaiveDate>,
    priority: TaskPriority,
    category: Option<String>,
    position: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .as_deref()
            .map(TaskCategory::parse_optional)
            .transpose()
            .map_err(RepositoryError::DataCorruption)?
            .flatten();

        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            status: row.status,
            assigned_to: row.assigned_to,
            due_date: row.due_date,
            priority: row.priority,
            category,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AssignedTaskRow {
    #[sqlx(flatten)]
    task: TaskRow,
    project_name: Option<String>,
}

impl TryFrom<AssignedTaskRow> for AssignedTask {
    type Error = RepositoryError;

    fn try_from(row: AssignedTaskRow) -> Result<Self, Self::Error> {
        Ok(Self {
            task: row.task.try_into()?,
            project_name: row.project_name,
        })
    }
}

/// Totals shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskTotals {
    pub total: i64,
    pub completed: i64,
}

/// Repository for task database operations.
pub struct TaskRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepository<'a> {
    /// Create a new task repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Tasks of a project in board order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` for an unknown stored category.
    pub async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM plooma.task WHERE project_id = $1 ORDER BY position, id"
        ))
        .bind(project_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    /// Tasks assigned to a user, with their project names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_assigned_to(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AssignedTask>, RepositoryError> {
        let rows = sqlx::query_as::<_, AssignedTaskRow>(
            r"
            SELECT t.id, t.project_id, t.title, t.description, t.status, t.assigned_to,
                   t.due_date, t.priority, t.category, t.position, t.created_at, t.updated_at,
                   p.name AS project_name
            FROM plooma.task t
            LEFT JOIN plooma.project p ON p.id = t.project_id
            WHERE t.assigned_to = $1
            ORDER BY t.due_date NULLS LAST, t.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AssignedTask::try_from).collect()
    }

    /// Get a task by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM plooma.task WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    /// Get a task by ID with the name of its project.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_project(
        &self,
        id: TaskId,
    ) -> Result<Option<AssignedTask>, RepositoryError> {
        let row = sqlx::query_as::<_, AssignedTaskRow>(
            r"
            SELECT t.id, t.project_id, t.title, t.description, t.status, t.assigned_to,
                   t.due_date, t.priority, t.category, t.position, t.created_at, t.updated_at,
                   p.name AS project_name
            FROM plooma.task t
            LEFT JOIN plooma.project p ON p.id = t.project_id
            WHERE t.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(AssignedTask::try_from).transpose()
    }

    /// Insert a task at the end of its project's board.
    ///
    /// The position is computed in the same statement as the insert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the project does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewTask) -> Result<Task, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r"
            INSERT INTO plooma.task
                (project_id, title, description, assigned_to, priority, category, due_date, position)
            SELECT $1, $2, $3, $4, $5, $6, $7, COALESCE(MAX(position), 0) + 1
            FROM plooma.task
            WHERE project_id = $1
            RETURNING {TASK_COLUMNS}
            "
        ))
        .bind(new.project_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.assigned_to)
        .bind(new.priority)
        .bind(new.category.map(TaskCategory::as_str))
        .bind(new.due_date)
        .fetch_one(self.pool)
        .await
        .map_err(map_missing_reference)?;

        row.try_into()
    }

    /// Set a task's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task does not exist.
    pub async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Task, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "UPDATE plooma.task SET status = $2 WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Assign a task to a user, or unassign it with `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task or the user does not exist.
    pub async fn update_assignee(
        &self,
        id: TaskId,
        assignee: Option<UserId>,
    ) -> Result<Task, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "UPDATE plooma.task SET assigned_to = $2 WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(assignee)
        .fetch_optional(self.pool)
        .await
        .map_err(map_missing_reference)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a task and, through the schema, its comments.
    ///
    /// # Returns
    ///
    /// Returns `true` if the task was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: TaskId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM plooma.task WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all tasks and completed tasks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<TaskTotals, RepositoryError> {
        let totals = sqlx::query_as::<_, TaskTotals>(
            r"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'done') AS completed
            FROM plooma.task
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }
}
