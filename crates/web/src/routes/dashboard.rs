//! Dashboard route handlers.
//!
//! `/dashboard` sends each user to their role dashboard. Admins get the
//! overview cards; members get their assigned task queue and a detail page
//! per task.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use plooma_core::{TaskId, TaskStatus};

use crate::db::{CommentRepository, ProjectRepository, TaskRepository, TaskTotals};
use crate::error::AppError;
use crate::filters;
use crate::flash::{Flash, MessageQuery};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{AssignedTask, CommentWithAuthor, CurrentUser};
use crate::state::AppState;

use super::breadcrumbs::{Crumb, trail};

/// Signed-in user as shown in the app header.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
    pub initial: String,
    pub is_admin: bool,
    pub dashboard_path: &'static str,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            name: user.display_name().to_string(),
            initial: plooma_core::avatar_initial(&user.full_name),
            is_admin: user.is_admin(),
            dashboard_path: user.role.dashboard_path(),
        }
    }
}

/// Status option for a `<select>`.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Options for the status select. A blocked task keeps its status listed.
pub(crate) fn status_options(current: TaskStatus) -> Vec<StatusOption> {
    let mut options: Vec<StatusOption> = TaskStatus::SELECTABLE
        .iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            label: status.label(),
            selected: *status == current,
        })
        .collect();

    if !TaskStatus::SELECTABLE.contains(&current) {
        options.push(StatusOption {
            value: current.as_str(),
            label: current.label(),
            selected: true,
        });
    }

    options
}

/// Comment display data for templates.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub author: String,
    pub content: String,
    pub created: String,
}

impl From<&CommentWithAuthor> for CommentView {
    fn from(c: &CommentWithAuthor) -> Self {
        Self {
            author: c.author().to_string(),
            content: c.comment.content.clone(),
            created: c.comment.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

// =============================================================================
// Role redirect
// =============================================================================

/// Send the user to the dashboard for their role.
pub async fn index(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    Redirect::to(user.role.dashboard_path())
}

// =============================================================================
// Admin dashboard
// =============================================================================

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/admin.html")]
pub struct AdminDashboardTemplate {
    pub user: UserView,
    pub crumbs: Vec<Crumb>,
    pub flash: Flash,
    pub project_count: i64,
    pub task_count: i64,
    pub completed_count: i64,
}

/// Admin dashboard with project statistics.
#[instrument(skip(admin, state))]
pub async fn admin(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let project_count = ProjectRepository::new(state.pool())
        .count()
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to count projects: {e}");
            0
        });

    let totals = TaskRepository::new(state.pool())
        .totals()
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to count tasks: {e}");
            TaskTotals::default()
        });

    AdminDashboardTemplate {
        user: UserView::from(&admin),
        crumbs: trail("/dashboard/admin", None),
        flash: Flash::from_query(&query),
        project_count,
        task_count: totals.total,
        completed_count: totals.completed,
    }
}

// =============================================================================
// Member dashboard
// =============================================================================

/// Assigned task row.
#[derive(Debug, Clone)]
pub struct MemberTaskView {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub project: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub due: String,
}

impl From<&AssignedTask> for MemberTaskView {
    fn from(t: &AssignedTask) -> Self {
        Self {
            id: t.task.id,
            title: t.task.title.clone(),
            description: t.task.description.clone(),
            project: t.project().to_string(),
            status: t.task.status.as_str(),
            status_label: t.task.status.label(),
            due: t.task.due_label(),
        }
    }
}

/// Member dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/member.html")]
pub struct MemberDashboardTemplate {
    pub user: UserView,
    pub crumbs: Vec<Crumb>,
    pub flash: Flash,
    pub tasks: Vec<MemberTaskView>,
}

/// Tasks assigned to the current user.
#[instrument(skip(user, state))]
pub async fn member(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let mut flash = Flash::from_query(&query);

    let tasks = match TaskRepository::new(state.pool())
        .list_assigned_to(user.id)
        .await
    {
        Ok(tasks) => tasks.iter().map(MemberTaskView::from).collect(),
        Err(e) => {
            tracing::error!("Failed to fetch assigned tasks: {e}");
            flash.error = Some("Failed to fetch tasks");
            vec![]
        }
    };

    MemberDashboardTemplate {
        user: UserView::from(&user),
        crumbs: trail("/dashboard/member", None),
        flash,
        tasks,
    }
}

// =============================================================================
// Task detail
// =============================================================================

/// Task detail template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/task_detail.html")]
pub struct TaskDetailTemplate {
    pub user: UserView,
    pub crumbs: Vec<Crumb>,
    pub flash: Flash,
    pub task: MemberTaskView,
    pub priority: &'static str,
    pub statuses: Vec<StatusOption>,
    pub comments: Vec<CommentView>,
    /// Where status and comment forms return to.
    pub back: String,
}

/// Task detail with comments.
#[instrument(skip(user, state))]
pub async fn task_detail(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let task = TaskRepository::new(state.pool())
        .get_with_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task {id}")))?;

    let comments = match CommentRepository::new(state.pool()).list_for_task(id).await {
        Ok(comments) => comments.iter().map(CommentView::from).collect(),
        Err(e) => {
            tracing::error!("Failed to fetch comments: {e}");
            vec![]
        }
    };

    let back = format!("/dashboard/member/tasks/{id}");
    let mut crumbs = trail("/dashboard/member", None);
    crumbs.push(Crumb::new(task.task.title.clone(), back.clone()));

    Ok(TaskDetailTemplate {
        user: UserView::from(&user),
        crumbs,
        flash: Flash::from_query(&query),
        priority: task.task.priority.label(),
        statuses: status_options(task.task.status),
        task: MemberTaskView::from(&task),
        comments,
        back,
    })
}
