//! Post/Redirect/Get banners.
//!
//! Form handlers redirect with `?error=<code>` or `?success=<code>`. The
//! page that receives the redirect maps the code back to a fixed banner
//! string here. Unknown codes render nothing.

use serde::Deserialize;

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Banner strings resolved from a [`MessageQuery`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flash {
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

impl Flash {
    /// Resolve the codes in a query string.
    #[must_use]
    pub fn from_query(query: &MessageQuery) -> Self {
        Self {
            error: query.error.as_deref().and_then(error_message),
            success: query.success.as_deref().and_then(success_message),
        }
    }
}

/// Banner for an error code.
#[must_use]
pub fn error_message(code: &str) -> Option<&'static str> {
    let message = match code {
        // auth
        "credentials" => "Invalid login credentials",
        "missing_fields" => "Please fill in all fields.",
        "weak_password" => "Password should be at least 6 characters.",
        "email_taken" => "User already registered",
        "invalid_email" => "Unable to validate email address: invalid format",
        "admin_signup_disabled" => "Admin sign-up is disabled. Ask an admin to create your account.",
        "session" | "unexpected" => "An unexpected error occurred",
        // members
        "fetch_users" => "Failed to fetch users.",
        "create_user" => "Failed to create user. Please try again.",
        "update_user" => "Failed to update user.",
        "delete_user" => "Failed to delete user.",
        "self_delete" => "You cannot delete your own account.",
        // projects
        "fetch_projects" => "Failed to fetch projects.",
        "project_title" => "Project title is required",
        "project_name" => "Project name is required",
        "create_project" => "Failed to create project. Please try again.",
        "update_project" => "Failed to update project.",
        "delete_project" => "Failed to delete project.",
        "invalid_date" => "Please enter a valid date.",
        // tasks
        "task_title" => "Task title is required",
        "create_task" => "Failed to create task.",
        "update_status" => "Failed to update status",
        "update_assignee" => "Failed to update assignee.",
        "delete_task" => "Failed to delete task.",
        "add_comment" => "Failed to add comment.",
        // profile
        "full_name" => "Full name is required.",
        "update_profile" => "Failed to update profile.",
        _ => return None,
    };
    Some(message)
}

/// Banner for a success code.
#[must_use]
pub fn success_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "user_created" => "User created successfully!",
        "user_updated" => "User updated successfully!",
        "user_deleted" => "User deleted successfully.",
        "project_created" => "Project created successfully!",
        "project_updated" => "Project updated successfully!",
        "project_deleted" => "Project deleted successfully.",
        "task_created" => "Task created successfully!",
        "status_updated" => "Status updated successfully!",
        "assignee_updated" => "Assignee updated successfully!",
        "task_deleted" => "Task deleted successfully.",
        "comment_added" => "Comment added.",
        "profile_updated" => "Profile updated successfully!",
        "signed_out" => "You have been signed out.",
        _ => return None,
    };
    Some(message)
}

/// Append a flash code to a local path.
#[must_use]
pub fn with_code(path: &str, kind: &str, code: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{kind}={code}")
}

/// Only accept local redirect targets.
///
/// Anything that is not an absolute path on this host (including
/// protocol-relative `//host` URLs) yields `None`.
#[must_use]
pub fn safe_redirect(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    if next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\") {
        Some(next)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_resolve() {
        let query = MessageQuery {
            error: Some("credentials".to_string()),
            success: Some("user_created".to_string()),
        };
        let flash = Flash::from_query(&query);
        assert_eq!(flash.error, Some("Invalid login credentials"));
        assert_eq!(flash.success, Some("User created successfully!"));
    }

    #[test]
    fn test_unknown_codes_are_ignored() {
        let query = MessageQuery {
            error: Some("<script>".to_string()),
            success: Some("nope".to_string()),
        };
        assert_eq!(Flash::from_query(&query), Flash::default());
        assert_eq!(Flash::from_query(&MessageQuery::default()), Flash::default());
    }

    #[test]
    fn test_member_banners_match_page_copy() {
        assert_eq!(error_message("missing_fields"), Some("Please fill in all fields."));
        assert_eq!(error_message("fetch_users"), Some("Failed to fetch users."));
        assert_eq!(error_message("delete_user"), Some("Failed to delete user."));
        assert_eq!(success_message("user_updated"), Some("User updated successfully!"));
        assert_eq!(success_message("user_deleted"), Some("User deleted successfully."));
    }

    #[test]
    fn test_with_code() {
        assert_eq!(
            with_code("/dashboard/members", "success", "user_created"),
            "/dashboard/members?success=user_created"
        );
        assert_eq!(
            with_code("/dashboard/members?role=admin", "error", "delete_user"),
            "/dashboard/members?role=admin&error=delete_user"
        );
    }

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(Some("/dashboard/projects/3")), Some("/dashboard/projects/3"));
        assert_eq!(safe_redirect(Some("//evil.example")), None);
        assert_eq!(safe_redirect(Some("/\\evil.example")), None);
        assert_eq!(safe_redirect(Some("https://evil.example")), None);
        assert_eq!(safe_redirect(Some("")), None);
        assert_eq!(safe_redirect(None), None);
    }
}
