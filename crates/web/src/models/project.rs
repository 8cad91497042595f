//! Project domain types.

use chrono::{DateTime, NaiveDate, Utc};

use plooma_core::{ProjectId, UserId};

use super::UNKNOWN;

/// A project (domain type).
#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    /// Creating user; cleared when that user is deleted.
    pub owner_id: Option<UserId>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project joined with its creator's name for the projects list.
#[derive(Debug, Clone)]
pub struct ProjectWithOwner {
    pub project: Project,
    /// `None` when there is no owner or the owner has no row.
    pub owner_name: Option<String>,
}

impl ProjectWithOwner {
    /// Creator name, falling back to "Unknown".
    #[must_use]
    pub fn creator(&self) -> &str {
        match self.owner_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN,
        }
    }

    /// Case-insensitive match on name or description.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.project.name.to_lowercase().contains(&needle)
            || self.project.description.to_lowercase().contains(&needle)
    }
}

/// Fields for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub owner_id: Option<UserId>,
    pub due_date: Option<NaiveDate>,
}

/// Editable project fields.
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub name: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
}
