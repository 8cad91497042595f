//! Task route handlers.
//!
//! Status changes and comments are open to any signed-in user. Reassigning
//! and deleting tasks is admin only. Every form may carry a local `next`
//! path to return to; otherwise the task's project board is used.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use plooma_core::{TaskId, TaskStatus, UserId};

use crate::db::{CommentRepository, RepositoryError, TaskRepository};
use crate::error::AppError;
use crate::flash::{safe_redirect, with_code};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::state::AppState;

use super::non_blank;

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
    pub next: Option<String>,
}

/// Reassign form data. A blank assignee unassigns the task.
#[derive(Debug, Deserialize)]
pub struct AssigneeForm {
    pub assigned_to: Option<String>,
    pub next: Option<String>,
}

/// Comment form data.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub content: String,
    pub next: Option<String>,
}

/// Form data carrying only a return path.
#[derive(Debug, Deserialize)]
pub struct NextForm {
    pub next: Option<String>,
}

/// Where to send the user after acting on a task.
async fn return_path(state: &AppState, id: TaskId, next: Option<&str>) -> String {
    if let Some(next) = safe_redirect(next) {
        return next.to_string();
    }
    match TaskRepository::new(state.pool()).get_by_id(id).await {
        Ok(Some(task)) => format!("/dashboard/projects/{}", task.project_id),
        Ok(None) => "/dashboard".to_string(),
        Err(e) => {
            tracing::error!("Failed to look up task: {e}");
            "/dashboard".to_string()
        }
    }
}

/// Change a task's status.
#[instrument(skip(user, state, form))]
pub async fn update_status(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(form): Form<StatusForm>,
) -> impl IntoResponse {
    let back = return_path(&state, id, form.next.as_deref()).await;

    let Ok(status) = form.status.parse::<TaskStatus>() else {
        return Redirect::to(&with_code(&back, "error", "update_status"));
    };

    match TaskRepository::new(state.pool())
        .update_status(id, status)
        .await
    {
        Ok(task) => {
            tracing::info!(user_id = %user.id, task_id = %task.id, status = %status, "Task status changed");
            Redirect::to(&with_code(&back, "success", "status_updated"))
        }
        Err(e) => {
            tracing::warn!("Failed to update status: {e}");
            Redirect::to(&with_code(&back, "error", "update_status"))
        }
    }
}

/// Reassign a task, or unassign it.
#[instrument(skip(admin, state, form))]
pub async fn update_assignee(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(form): Form<AssigneeForm>,
) -> impl IntoResponse {
    let back = return_path(&state, id, form.next.as_deref()).await;

    let assignee = match non_blank(form.assigned_to.as_deref())
        .map(str::parse::<UserId>)
        .transpose()
    {
        Ok(assignee) => assignee,
        Err(_) => return Redirect::to(&with_code(&back, "error", "update_assignee")),
    };

    match TaskRepository::new(state.pool())
        .update_assignee(id, assignee)
        .await
    {
        Ok(task) => {
            tracing::info!(admin_id = %admin.id, task_id = %task.id, "Task reassigned");
            Redirect::to(&with_code(&back, "success", "assignee_updated"))
        }
        Err(e) => {
            tracing::warn!("Failed to update assignee: {e}");
            Redirect::to(&with_code(&back, "error", "update_assignee"))
        }
    }
}

/// Delete a task and its comments.
#[instrument(skip(admin, state, form))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(form): Form<NextForm>,
) -> Result<impl IntoResponse, AppError> {
    let repo = TaskRepository::new(state.pool());
    let task = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task {id}")))?;

    let back = safe_redirect(form.next.as_deref()).map_or_else(
        || format!("/dashboard/projects/{}", task.project_id),
        ToString::to_string,
    );

    let redirect = match repo.delete(id).await {
        Ok(true) => {
            tracing::info!(admin_id = %admin.id, task_id = %id, "Task deleted");
            Redirect::to(&with_code(&back, "success", "task_deleted"))
        }
        Ok(false) => Redirect::to(&with_code(&back, "error", "delete_task")),
        Err(e) => {
            tracing::error!("Failed to delete task: {e}");
            Redirect::to(&with_code(&back, "error", "delete_task"))
        }
    };

    Ok(redirect)
}

/// Add a comment to a task. Blank comments are ignored.
#[instrument(skip(user, state, form))]
pub async fn add_comment(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(form): Form<CommentForm>,
) -> impl IntoResponse {
    let back = return_path(&state, id, form.next.as_deref()).await;

    let content = form.content.trim();
    if content.is_empty() {
        return Redirect::to(&back);
    }

    match CommentRepository::new(state.pool())
        .create(id, user.id, content)
        .await
    {
        Ok(_) => Redirect::to(&with_code(&back, "success", "comment_added")),
        Err(RepositoryError::NotFound) => {
            tracing::warn!(task_id = %id, "Comment on missing task");
            Redirect::to(&with_code(&back, "error", "add_comment"))
        }
        Err(e) => {
            tracing::error!("Failed to add comment: {e}");
            Redirect::to(&with_code(&back, "error", "add_comment"))
        }
    }
}
