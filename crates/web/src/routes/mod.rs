//! HTTP route handlers for Plooma.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                    - Landing page
//!
//! # Auth
//! GET  /signup                              - Sign-up page
//! POST /signup                              - Sign-up action (rate limited)
//! GET  /signin                              - Sign-in page
//! POST /signin                              - Sign-in action (rate limited)
//! POST /signout                             - Sign-out action
//!
//! # Dashboards (requires auth)
//! GET  /dashboard                           - Redirect to the role dashboard
//! GET  /dashboard/admin                     - Admin dashboard (admin)
//! GET  /dashboard/member                    - Assigned task queue
//! GET  /dashboard/member/tasks/{id}         - Task detail with comments
//! POST /dashboard/member/tasks/{id}/status  - Change status from the detail page
//!
//! # Members (admin)
//! GET  /dashboard/members                   - Directory with role tabs and search
//! POST /dashboard/members                   - Create user
//! POST /dashboard/members/{id}              - Rename user
//! POST /dashboard/members/{id}/delete       - Delete user
//!
//! # Projects
//! GET  /dashboard/projects                  - Project list with search
//! POST /dashboard/projects                  - Create project (admin)
//! GET  /dashboard/create-project            - Standalone create page (admin)
//! POST /dashboard/create-project            - Create project (admin)
//! GET  /dashboard/projects/{id}             - Project board
//! GET  /dashboard/projects/{id}/edit        - Edit page (admin)
//! POST /dashboard/projects/{id}/edit        - Update project (admin)
//! POST /dashboard/projects/{id}/delete      - Delete project (admin)
//! POST /dashboard/projects/{id}/tasks       - Create task (admin)
//!
//! # Tasks
//! POST /dashboard/tasks/{id}/status         - Change status
//! POST /dashboard/tasks/{id}/assignee       - Reassign (admin)
//! POST /dashboard/tasks/{id}/delete         - Delete task (admin)
//! POST /dashboard/tasks/{id}/comments       - Add comment
//!
//! # Profile (requires auth)
//! GET  /profile                             - Profile page
//! POST /profile                             - Update full name
//! ```

pub mod auth;
pub mod breadcrumbs;
pub mod dashboard;
pub mod home;
pub mod members;
pub mod profile;
pub mod projects;
pub mod tasks;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::NaiveDate;

use crate::config::PloomaConfig;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router. Form submissions are rate limited.
pub fn auth_routes(config: &PloomaConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/signup",
            get(auth::signup_page).merge(post(auth::signup).layer(auth_rate_limiter(config))),
        )
        .route(
            "/signin",
            get(auth::signin_page).merge(post(auth::signin).layer(auth_rate_limiter(config))),
        )
        .route("/signout", post(auth::signout))
}

/// Create the dashboard routes router (mounted at `/dashboard`).
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/admin", get(dashboard::admin))
        .route("/member", get(dashboard::member))
        .route("/member/tasks/{id}", get(dashboard::task_detail))
        .route("/member/tasks/{id}/status", post(tasks::update_status))
        // Members
        .route("/members", get(members::index).post(members::create))
        .route("/members/{id}", post(members::update))
        .route("/members/{id}/delete", post(members::delete))
        // Projects
        .route("/projects", get(projects::index).post(projects::create))
        .route(
            "/create-project",
            get(projects::new_page).post(projects::create_from_page),
        )
        .route("/projects/{id}", get(projects::show))
        .route(
            "/projects/{id}/edit",
            get(projects::edit_page).post(projects::update),
        )
        .route("/projects/{id}/delete", post(projects::delete))
        .route("/projects/{id}/tasks", post(projects::create_task))
        // Tasks
        .route("/tasks/{id}/status", post(tasks::update_status))
        .route("/tasks/{id}/assignee", post(tasks::update_assignee))
        .route("/tasks/{id}/delete", post(tasks::delete))
        .route("/tasks/{id}/comments", post(tasks::add_comment))
}

/// Create all page routes.
pub fn routes(config: &PloomaConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(auth_routes(config))
        .nest("/dashboard", dashboard_routes())
        .route("/profile", get(profile::show).post(profile::update))
}

/// Parse an optional `<input type="date">` value. Blank means no date.
pub(crate) fn parse_optional_date(
    input: Option<&str>,
) -> Result<Option<NaiveDate>, chrono::ParseError> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d").map(Some),
    }
}

/// Treat a blank form field as absent.
pub(crate) fn non_blank(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}
