//! User domain types.

use chrono::{DateTime, Utc};

use plooma_core::{DirectoryEntry, Email, Role, UserId, avatar_initial, display_name};

/// A Plooma account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address.
    pub email: Email,
    /// Display name; may be empty.
    pub full_name: String,
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name to render, with the "No Name" fallback.
    #[must_use]
    pub fn display_name(&self) -> &str {
        display_name(&self.full_name)
    }

    /// Avatar letter for assignee badges.
    #[must_use]
    pub fn initial(&self) -> String {
        avatar_initial(&self.full_name)
    }
}

impl DirectoryEntry for User {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn email(&self) -> &str {
        self.email.as_str()
    }

    fn role(&self) -> Role {
        self.role
    }
}
