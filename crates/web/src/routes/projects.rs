//! Project route handlers.
//!
//! The projects list, project create/edit/delete and the project board.
//! Any signed-in user can view; changes are admin only.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use plooma_core::{
    Board, BoardStats, BoardTab, ProjectId, TaskCategory, TaskId, TaskPriority, UserId,
};

use crate::db::{
    CommentRepository, ProjectRepository, RepositoryError, TaskRepository, UserRepository,
};
use crate::error::AppError;
use crate::filters;
use crate::flash::{Flash, MessageQuery, with_code};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{CommentWithAuthor, NewProject, NewTask, Project, ProjectUpdate, Task, User};
use crate::state::AppState;

use super::breadcrumbs::{Crumb, trail};
use super::dashboard::{CommentView, StatusOption, UserView, status_options};
use super::{non_blank, parse_optional_date};

/// Heading when a project has no name.
pub const UNTITLED: &str = "Project Details";
/// Shown for a project without a description.
pub const NO_DESCRIPTION: &str = "No description available";
/// Shown for a project without a due date.
pub const NO_DEADLINE: &str = "Not set";

// =============================================================================
// Form Types
// =============================================================================

/// Search query for the projects list.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Create-project form data.
#[derive(Debug, Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub due_date: Option<String>,
}

/// Board query: active category tab.
#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    pub tab: Option<String>,
}

/// New task form data.
#[derive(Debug, Deserialize)]
pub struct NewTaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub assigned_to: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<String>,
    pub tab: Option<String>,
}

// =============================================================================
// Views
// =============================================================================

/// Project card on the projects list.
#[derive(Debug, Clone)]
pub struct ProjectCardView {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub creator: String,
    pub created: String,
    pub due: String,
}

/// Assignee option for a `<select>`; an empty value means unassigned.
#[derive(Debug, Clone)]
pub struct AssigneeOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

fn assignee_options(users: &[User], current: Option<UserId>) -> Vec<AssigneeOption> {
    let mut options = vec![AssigneeOption {
        value: String::new(),
        label: "Unassigned".to_string(),
        selected: current.is_none(),
    }];
    options.extend(users.iter().map(|u| AssigneeOption {
        value: u.id.to_string(),
        label: u.display_name().to_string(),
        selected: current == Some(u.id),
    }));
    options
}

/// Value/label pair for static selects.
#[derive(Debug, Clone, Copy)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// A task card with its details drawer.
#[derive(Debug, Clone)]
pub struct TaskCardView {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: &'static str,
    pub priority_label: &'static str,
    pub category: &'static str,
    pub due: String,
    pub assignee_name: String,
    pub assignee_initial: String,
    pub statuses: Vec<StatusOption>,
    pub assignees: Vec<AssigneeOption>,
    pub comments: Vec<CommentView>,
}

/// One board column.
#[derive(Debug, Clone)]
pub struct ColumnView {
    pub status: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub tasks: Vec<TaskCardView>,
}

/// Category tab link.
#[derive(Debug, Clone)]
pub struct TabView {
    pub value: &'static str,
    pub active: bool,
}

/// Board header and stats.
#[derive(Debug, Clone)]
pub struct ProjectHeaderView {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub due: String,
    pub tasks_label: String,
    pub members_label: String,
    pub progress_percent: u8,
}

impl ProjectHeaderView {
    fn new(project: &Project, stats: BoardStats) -> Self {
        let name = project.name.trim();
        let description = project.description.trim();
        Self {
            id: project.id,
            name: if name.is_empty() { UNTITLED } else { name }.to_string(),
            description: if description.is_empty() {
                NO_DESCRIPTION
            } else {
                description
            }
            .to_string(),
            due: project
                .due_date
                .map_or_else(|| NO_DEADLINE.to_string(), |d| d.to_string()),
            tasks_label: format!("{} / {} Completed", stats.completed, stats.total),
            members_label: format!("{} Active", stats.active_members),
            progress_percent: stats.progress_percent,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Projects list template.
#[derive(Template, WebTemplate)]
#[template(path = "projects/index.html")]
pub struct ProjectsTemplate {
    pub user: UserView,
    pub crumbs: Vec<Crumb>,
    pub flash: Flash,
    pub query: String,
    pub can_manage: bool,
    pub projects: Vec<ProjectCardView>,
}

/// Standalone create-project page template.
#[derive(Template, WebTemplate)]
#[template(path = "projects/new.html")]
pub struct NewProjectTemplate {
    pub user: UserView,
    pub crumbs: Vec<Crumb>,
    pub flash: Flash,
}

/// Edit project template.
#[derive(Template, WebTemplate)]
#[template(path = "projects/edit.html")]
pub struct EditProjectTemplate {
    pub user: UserView,
    pub crumbs: Vec<Crumb>,
    pub flash: Flash,
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    /// `YYYY-MM-DD` or empty.
    pub due_date: String,
}

/// Project board template.
#[derive(Template, WebTemplate)]
#[template(path = "projects/show.html")]
pub struct ProjectBoardTemplate {
    pub user: UserView,
    pub crumbs: Vec<Crumb>,
    pub flash: Flash,
    pub project: ProjectHeaderView,
    pub tabs: Vec<TabView>,
    pub tab: &'static str,
    pub columns: Vec<ColumnView>,
    pub can_manage: bool,
    /// Board URL including the active tab; forms post back here.
    pub back: String,
    pub assignees: Vec<AssigneeOption>,
    pub priorities: Vec<Choice>,
    pub categories: Vec<Choice>,
}

// =============================================================================
// Projects list
// =============================================================================

/// Projects list, newest first, filtered by `?q=`.
#[instrument(skip(user, state))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let mut flash = Flash::from_query(&query);
    let needle = search.q.unwrap_or_default();

    let projects = match ProjectRepository::new(state.pool()).list_with_owner().await {
        Ok(projects) => projects
            .iter()
            .filter(|p| p.matches(&needle))
            .map(|p| ProjectCardView {
                id: p.project.id,
                name: p.project.name.clone(),
                description: p.project.description.clone(),
                creator: p.creator().to_string(),
                created: p.project.created_at.format("%Y-%m-%d").to_string(),
                due: p
                    .project
                    .due_date
                    .map_or_else(|| NO_DEADLINE.to_string(), |d| d.to_string()),
            })
            .collect(),
        Err(e) => {
            tracing::error!("Failed to fetch projects: {e}");
            flash.error = Some("Failed to fetch projects.");
            vec![]
        }
    };

    ProjectsTemplate {
        user: UserView::from(&user),
        crumbs: trail("/dashboard/projects", None),
        flash,
        query: needle,
        can_manage: user.is_admin(),
        projects,
    }
}

/// Validate a project form into its fields, or a flash error code.
fn project_fields(
    form: &ProjectForm,
    missing_name: &'static str,
) -> Result<(String, String, Option<chrono::NaiveDate>), &'static str> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(missing_name);
    }
    let due_date = parse_optional_date(form.due_date.as_deref()).map_err(|_| "invalid_date")?;
    Ok((name.to_string(), form.description.trim().to_string(), due_date))
}

async fn insert_project(
    state: &AppState,
    owner: UserId,
    form: &ProjectForm,
) -> Result<Project, &'static str> {
    let (name, description, due_date) = project_fields(form, "project_title")?;

    ProjectRepository::new(state.pool())
        .create(&NewProject {
            name,
            description,
            owner_id: Some(owner),
            due_date,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to create project: {e}");
            "create_project"
        })
}

/// Create a project from the list page modal.
#[instrument(skip(admin, state, form))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<ProjectForm>,
) -> impl IntoResponse {
    match insert_project(&state, admin.id, &form).await {
        Ok(project) => {
            tracing::info!(project_id = %project.id, "Project created");
            Redirect::to("/dashboard/projects?success=project_created")
        }
        Err(code) => Redirect::to(&with_code("/dashboard/projects", "error", code)),
    }
}

// =============================================================================
// Create-project page
// =============================================================================

/// Standalone create-project page.
pub async fn new_page(
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    NewProjectTemplate {
        user: UserView::from(&admin),
        crumbs: trail("/dashboard/create-project", None),
        flash: Flash::from_query(&query),
    }
}

/// Create a project from the standalone page, then return to the admin dashboard.
#[instrument(skip(admin, state, form))]
pub async fn create_from_page(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<ProjectForm>,
) -> impl IntoResponse {
    match insert_project(&state, admin.id, &form).await {
        Ok(project) => {
            tracing::info!(project_id = %project.id, "Project created");
            Redirect::to("/dashboard/admin?success=project_created")
        }
        Err(code) => Redirect::to(&with_code("/dashboard/create-project", "error", code)),
    }
}

// =============================================================================
// Edit / delete
// =============================================================================

/// Edit project page.
#[instrument(skip(admin, state))]
pub async fn edit_page(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let project = ProjectRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("project {id}")))?;

    Ok(EditProjectTemplate {
        user: UserView::from(&admin),
        crumbs: trail(&format!("/dashboard/projects/{id}/edit"), Some(&project.name)),
        flash: Flash::from_query(&query),
        id,
        due_date: project.due_date.map(|d| d.to_string()).unwrap_or_default(),
        name: project.name,
        description: project.description,
    })
}

/// Save project edits, then return to the board.
#[instrument(skip(_admin, state, form))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    Form(form): Form<ProjectForm>,
) -> impl IntoResponse {
    let edit_path = format!("/dashboard/projects/{id}/edit");

    let (name, description, due_date) = match project_fields(&form, "project_name") {
        Ok(fields) => fields,
        Err(code) => return Redirect::to(&with_code(&edit_path, "error", code)),
    };

    match ProjectRepository::new(state.pool())
        .update(
            id,
            &ProjectUpdate {
                name,
                description,
                due_date,
            },
        )
        .await
    {
        Ok(_) => Redirect::to(&format!("/dashboard/projects/{id}?success=project_updated")),
        Err(RepositoryError::NotFound) => {
            Redirect::to("/dashboard/projects?error=update_project")
        }
        Err(e) => {
            tracing::error!("Failed to update project: {e}");
            Redirect::to(&with_code(&edit_path, "error", "update_project"))
        }
    }
}

/// Delete a project with its tasks and comments.
#[instrument(skip(admin, state))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> impl IntoResponse {
    match ProjectRepository::new(state.pool()).delete(id).await {
        Ok(true) => {
            tracing::info!(admin_id = %admin.id, project_id = %id, "Project deleted");
            Redirect::to("/dashboard/projects?success=project_deleted")
        }
        Ok(false) => Redirect::to("/dashboard/projects?error=delete_project"),
        Err(e) => {
            tracing::error!("Failed to delete project: {e}");
            Redirect::to("/dashboard/projects?error=delete_project")
        }
    }
}

// =============================================================================
// Board
// =============================================================================

fn board_path(id: ProjectId, tab: BoardTab) -> String {
    match tab {
        BoardTab::All => format!("/dashboard/projects/{id}"),
        tab => format!("/dashboard/projects/{id}?tab={}", tab.as_str()),
    }
}

fn task_card(
    task: &Task,
    users: &[User],
    names: &HashMap<UserId, &User>,
    comments: &HashMap<TaskId, Vec<&CommentWithAuthor>>,
) -> TaskCardView {
    let assignee = task.assigned_to.and_then(|id| names.get(&id));
    TaskCardView {
        id: task.id,
        title: task.title.clone(),
        description: task.description.clone(),
        priority: task.priority.as_str(),
        priority_label: task.priority.label(),
        category: task.category.map_or("", TaskCategory::as_str),
        due: task.due_label(),
        assignee_name: assignee.map_or("Unassigned", |u| u.display_name()).to_string(),
        assignee_initial: assignee.map_or_else(|| "?".to_string(), |u| u.initial()),
        statuses: status_options(task.status),
        assignees: assignee_options(users, task.assigned_to),
        comments: comments
            .get(&task.id)
            .map(|list| list.iter().map(|c| CommentView::from(*c)).collect())
            .unwrap_or_default(),
    }
}

/// Project board: header, stats, category tabs and status columns.
#[instrument(skip(user, state))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    Query(board_query): Query<BoardQuery>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let project = ProjectRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("project {id}")))?;

    let mut flash = Flash::from_query(&query);
    let tab = BoardTab::from_query(board_query.tab.as_deref());

    let tasks = match TaskRepository::new(state.pool()).list_for_project(id).await {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::error!("Failed to fetch tasks: {e}");
            flash.error = Some("Failed to fetch tasks");
            vec![]
        }
    };

    let users = UserRepository::new(state.pool())
        .list()
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to fetch users: {e}");
            vec![]
        });
    let names: HashMap<UserId, &User> = users.iter().map(|u| (u.id, u)).collect();

    let task_ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
    let all_comments = CommentRepository::new(state.pool())
        .list_for_tasks(&task_ids)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to fetch comments: {e}");
            vec![]
        });
    let mut comments: HashMap<TaskId, Vec<&CommentWithAuthor>> = HashMap::new();
    for comment in &all_comments {
        comments.entry(comment.comment.task_id).or_default().push(comment);
    }

    let stats = BoardStats::compute(&tasks);
    let board = Board::group(&tasks, tab);
    let columns = board
        .columns()
        .into_iter()
        .map(|column| ColumnView {
            status: column.status.as_str(),
            label: column.status.label(),
            count: column.count(),
            tasks: column
                .items
                .iter()
                .map(|task| task_card(task, &users, &names, &comments))
                .collect(),
        })
        .collect();

    let tabs = BoardTab::ALL
        .iter()
        .map(|t| TabView {
            value: t.as_str(),
            active: *t == tab,
        })
        .collect();

    let header = ProjectHeaderView::new(&project, stats);
    let crumbs = trail(&format!("/dashboard/projects/{id}"), Some(&header.name));

    Ok(ProjectBoardTemplate {
        user: UserView::from(&user),
        crumbs,
        flash,
        project: header,
        tabs,
        tab: tab.as_str(),
        columns,
        can_manage: user.is_admin(),
        back: board_path(id, tab),
        assignees: assignee_options(&users, None),
        priorities: TaskPriority::ALL
            .iter()
            .map(|p| Choice {
                value: p.as_str(),
                label: p.label(),
            })
            .collect(),
        categories: TaskCategory::ALL
            .iter()
            .map(|c| Choice {
                value: c.as_str(),
                label: c.as_str(),
            })
            .collect(),
    })
}

/// Parse the new-task form, or return a flash error code.
fn new_task(project_id: ProjectId, form: &NewTaskForm) -> Result<NewTask, &'static str> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err("task_title");
    }

    let assigned_to = non_blank(form.assigned_to.as_deref())
        .map(str::parse::<UserId>)
        .transpose()
        .map_err(|_| "create_task")?;
    let priority = non_blank(form.priority.as_deref())
        .map(str::parse::<TaskPriority>)
        .transpose()
        .map_err(|_| "create_task")?
        .unwrap_or_default();
    let category = TaskCategory::parse_optional(form.category.as_deref().unwrap_or_default())
        .map_err(|_| "create_task")?;
    let due_date = parse_optional_date(form.due_date.as_deref()).map_err(|_| "invalid_date")?;

    Ok(NewTask {
        project_id,
        title: title.to_string(),
        description: form.description.trim().to_string(),
        assigned_to,
        priority,
        category,
        due_date,
    })
}

/// Add a task to the end of the board's To Do column.
#[instrument(skip(admin, state, form))]
pub async fn create_task(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    Form(form): Form<NewTaskForm>,
) -> impl IntoResponse {
    let back = board_path(id, BoardTab::from_query(form.tab.as_deref()));

    let new = match new_task(id, &form) {
        Ok(new) => new,
        Err(code) => return Redirect::to(&with_code(&back, "error", code)),
    };

    match TaskRepository::new(state.pool()).create(&new).await {
        Ok(task) => {
            tracing::info!(admin_id = %admin.id, task_id = %task.id, "Task created");
            Redirect::to(&with_code(&back, "success", "task_created"))
        }
        Err(e) => {
            tracing::warn!("Failed to create task: {e}");
            Redirect::to(&with_code(&back, "error", "create_task"))
        }
    }
}
