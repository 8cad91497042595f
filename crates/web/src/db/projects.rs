//! Project repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use plooma_core::{ProjectId, UserId};

use super::RepositoryError;
use crate::models::{NewProject, Project, ProjectUpdate, ProjectWithOwner};

const PROJECT_COLUMNS: &str = "id, name, description, owner_id, due_date, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: ProjectId,
    name: String,
    description: String,
    owner_id: Option<UserId>,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            owner_id: row.owner_id,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectWithOwnerRow {
    #[sqlx(flatten)]
    project: ProjectRow,
    owner_name: Option<String>,
}

/// Repository for project database operations.
pub struct ProjectRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProjectRepository<'a> {
    /// Create a new project repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all projects, newest first, with the creator's name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_owner(&self) -> Result<Vec<ProjectWithOwner>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProjectWithOwnerRow>(
            r"
            SELECT p.id, p.name, p.description, p.owner_id, p.due_date,
                   p.created_at, p.updated_at,
                   u.full_name AS owner_name
            FROM plooma.project p
            LEFT JOIN plooma.user u ON u.id = p.owner_id
            ORDER BY p.created_at DESC, p.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProjectWithOwner {
                project: r.project.into(),
                owner_name: r.owner_name,
            })
            .collect())
    }

    /// Get a project by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM plooma.project WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Project::from))
    }

    /// Insert a project.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProject) -> Result<Project, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "INSERT INTO plooma.project (name, description, owner_id, due_date) \
             VALUES ($1, $2, $3, $4) RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.owner_id)
        .bind(new.due_date)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace a project's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the project does not exist.
    pub async fn update(
        &self,
        id: ProjectId,
        update: &ProjectUpdate,
    ) -> Result<Project, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "UPDATE plooma.project SET name = $2, description = $3, due_date = $4 \
             WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.due_date)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a project and, through the schema, its tasks and comments.
    ///
    /// # Returns
    ///
    /// Returns `true` if the project was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProjectId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM plooma.project WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of projects.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM plooma.project")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
