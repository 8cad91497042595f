//! Members management route handlers (admin only).
//!
//! Role tabs, search, and create/rename/delete of user accounts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use plooma_core::{Role, UserId, filter_directory};

use crate::db::{RepositoryError, UserRepository};
use crate::filters;
use crate::flash::{Flash, MessageQuery, with_code};
use crate::middleware::RequireAdmin;
use crate::models::{CurrentUser, User, session::keys};
use crate::services::auth::AuthService;
use crate::state::AppState;

use super::auth::error_code;
use super::breadcrumbs::{Crumb, trail};
use super::dashboard::UserView;

/// Debounce delay for the search box, in milliseconds.
pub const SEARCH_DEBOUNCE_MS: u32 = 500;

/// Directory query: active role tab and search text.
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryQuery {
    pub role: Option<String>,
    pub q: Option<String>,
}

impl DirectoryQuery {
    fn role_tab(&self) -> Role {
        self.role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or_default()
    }
}

/// Create-user form data. Every field is required.
#[derive(Debug, Deserialize)]
pub struct CreateMemberForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    pub role: Option<String>,
}

/// Rename form data.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberForm {
    #[serde(default)]
    pub full_name: String,
    pub role: Option<String>,
}

/// Delete form data; only carries the tab to return to.
#[derive(Debug, Deserialize)]
pub struct DeleteMemberForm {
    pub role: Option<String>,
}

/// Role tab link.
#[derive(Debug, Clone)]
pub struct RoleTabView {
    pub value: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Directory card data.
#[derive(Debug, Clone)]
pub struct MemberView {
    pub id: UserId,
    pub name: String,
    pub full_name: String,
    pub email: String,
    pub initial: String,
    pub role: &'static str,
    pub is_self: bool,
}

impl MemberView {
    fn new(user: &User, current: &CurrentUser) -> Self {
        Self {
            id: user.id,
            name: user.display_name().to_string(),
            full_name: user.full_name.clone(),
            email: user.email.to_string(),
            initial: user.initial(),
            role: user.role.as_str(),
            is_self: user.id == current.id,
        }
    }
}

/// Members management page template.
#[derive(Template, WebTemplate)]
#[template(path = "members/index.html")]
pub struct MembersTemplate {
    pub user: UserView,
    pub crumbs: Vec<Crumb>,
    pub flash: Flash,
    pub tabs: Vec<RoleTabView>,
    pub role: &'static str,
    pub query: String,
    pub debounce_ms: u32,
    pub members: Vec<MemberView>,
}

fn members_path(role: Option<&str>) -> String {
    let role = role
        .and_then(|r| r.parse::<Role>().ok())
        .unwrap_or_default();
    format!("/dashboard/members?role={}", role.as_str())
}

/// Directory with role tabs and search.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(directory): Query<DirectoryQuery>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let mut flash = Flash::from_query(&query);
    let role_tab = directory.role_tab();
    let needle = directory.q.clone().unwrap_or_default();

    let users = match UserRepository::new(state.pool()).list().await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!("Failed to fetch users: {e}");
            flash.error = Some("Failed to fetch users.");
            vec![]
        }
    };

    let members = filter_directory(&users, role_tab, &needle)
        .into_iter()
        .map(|u| MemberView::new(u, &admin))
        .collect();

    let tabs = Role::ALL
        .iter()
        .map(|role| RoleTabView {
            value: role.as_str(),
            label: role.label(),
            active: *role == role_tab,
        })
        .collect();

    MembersTemplate {
        user: UserView::from(&admin),
        crumbs: trail("/dashboard/members", None),
        flash,
        tabs,
        role: role_tab.as_str(),
        query: needle,
        debounce_ms: SEARCH_DEBOUNCE_MS,
        members,
    }
}

/// Create a user with a password and role.
#[instrument(skip(admin, state, form), fields(email = %form.email))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<CreateMemberForm>,
) -> impl IntoResponse {
    let back = members_path(form.role.as_deref());

    let role = form.role.as_deref().and_then(|r| r.parse::<Role>().ok());
    let Some(role) = role else {
        return Redirect::to(&with_code(&back, "error", "missing_fields"));
    };
    if form.email.trim().is_empty() || form.password.is_empty() || form.full_name.trim().is_empty()
    {
        return Redirect::to(&with_code(&back, "error", "missing_fields"));
    }

    match AuthService::new(state.pool())
        .register(&form.full_name, &form.email, &form.password, role)
        .await
    {
        Ok(user) => {
            tracing::info!(admin_id = %admin.id, user_id = %user.id, "Admin created user");
            Redirect::to(&with_code(&back, "success", "user_created"))
        }
        Err(e) => {
            tracing::warn!("Failed to create user: {e}");
            Redirect::to(&with_code(&back, "error", error_code(&e)))
        }
    }
}

/// Rename a user.
#[instrument(skip(admin, state, session, form))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<UserId>,
    Form(form): Form<UpdateMemberForm>,
) -> impl IntoResponse {
    let back = members_path(form.role.as_deref());

    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Redirect::to(&with_code(&back, "error", "missing_fields"));
    }

    match UserRepository::new(state.pool())
        .update_full_name(id, full_name)
        .await
    {
        Ok(user) => {
            if user.id == admin.id {
                // Keep the header name in step with the new one.
                if let Err(e) = session
                    .insert(keys::CURRENT_USER, CurrentUser::from(&user))
                    .await
                {
                    tracing::error!("Failed to refresh session user: {e}");
                }
            }
            Redirect::to(&with_code(&back, "success", "user_updated"))
        }
        Err(RepositoryError::NotFound) => {
            tracing::warn!(user_id = %id, "Rename of missing user");
            Redirect::to(&with_code(&back, "error", "update_user"))
        }
        Err(e) => {
            tracing::error!("Failed to update user: {e}");
            Redirect::to(&with_code(&back, "error", "update_user"))
        }
    }
}

/// Delete a user. Admins cannot delete their own account.
#[instrument(skip(admin, state, form))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Form(form): Form<DeleteMemberForm>,
) -> impl IntoResponse {
    let back = members_path(form.role.as_deref());

    if id == admin.id {
        return Redirect::to(&with_code(&back, "error", "self_delete"));
    }

    match UserRepository::new(state.pool()).delete(id).await {
        Ok(true) => {
            tracing::info!(admin_id = %admin.id, user_id = %id, "Admin deleted user");
            Redirect::to(&with_code(&back, "success", "user_deleted"))
        }
        Ok(false) => Redirect::to(&with_code(&back, "error", "delete_user")),
        Err(e) => {
            tracing::error!("Failed to delete user: {e}");
            Redirect::to(&with_code(&back, "error", "delete_user"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_path_defaults_to_member_tab() {
        assert_eq!(members_path(None), "/dashboard/members?role=member");
        assert_eq!(members_path(Some("admin")), "/dashboard/members?role=admin");
        assert_eq!(members_path(Some("owner")), "/dashboard/members?role=member");
    }

    #[test]
    fn test_directory_query_role_tab() {
        let query = DirectoryQuery {
            role: Some("admin".to_string()),
            q: None,
        };
        assert_eq!(query.role_tab(), Role::Admin);
        assert_eq!(DirectoryQuery::default().role_tab(), Role::Member);
    }
}
