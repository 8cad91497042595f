//! User roles.

use serde::{Deserialize, Serialize};

/// Role attached to every user row.
///
/// The role decides which dashboard a user lands on after sign-in and gates
/// the admin-only pages (members management, project and task mutation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "plooma.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages projects, tasks and other users.
    Admin,
    /// Works an assigned task queue.
    #[default]
    Member,
}

impl Role {
    /// Both roles, in the order the members page shows its tabs.
    pub const ALL: [Self; 2] = [Self::Member, Self::Admin];

    /// Wire name used in forms, query strings and the database enum.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Plural label used for the members page tabs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admins",
            Self::Member => "Members",
        }
    }

    /// Landing page after sign-in.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Admin => "/dashboard/admin",
            Self::Member => "/dashboard/member",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_agree() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("owner".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_dashboard_paths() {
        assert_eq!(Role::Admin.dashboard_path(), "/dashboard/admin");
        assert_eq!(Role::Member.dashboard_path(), "/dashboard/member");
    }

    #[test]
    fn test_default_is_member() {
        assert_eq!(Role::default(), Role::Member);
        assert!(!Role::default().is_admin());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
