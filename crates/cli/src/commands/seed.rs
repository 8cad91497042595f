//! Seed the database with demo data.
//!
//! Creates one admin, two members, two projects with tasks spread across
//! the board and a few comments. Users that already exist are reused;
//! projects are only seeded into an empty database.

use chrono::{Days, NaiveDate, Utc};
use plooma_core::{Email, ProjectId, Role, TaskCategory, TaskPriority, TaskStatus, UserId};
use plooma_web::db::{CommentRepository, ProjectRepository, TaskRepository, UserRepository};
use plooma_web::models::{NewProject, NewTask};
use plooma_web::services::auth::{AuthError, AuthService};
use sqlx::PgPool;
use tracing::info;

use super::connect;

/// Demo accounts: full name, email, role.
const USERS: [(&str, &str, Role); 3] = [
    ("Ada Admin", "admin@plooma.test", Role::Admin),
    ("Max Member", "max@plooma.test", Role::Member),
    ("Mia Member", "mia@plooma.test", Role::Member),
];

struct DemoTask {
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    priority: TaskPriority,
    category: Option<TaskCategory>,
    /// Index into `USERS`.
    assignee: Option<usize>,
    due_in_days: Option<u64>,
    comment: Option<&'static str>,
}

struct DemoProject {
    name: &'static str,
    description: &'static str,
    due_in_days: Option<u64>,
    tasks: &'static [DemoTask],
}

const PROJECTS: [DemoProject; 2] = [
    DemoProject {
        name: "Website Redesign",
        description: "Refresh the marketing site and sign-up flow.",
        due_in_days: Some(30),
        tasks: &[
            DemoTask {
                title: "Wireframe landing page",
                description: "Hero, features and footer sections.",
                status: TaskStatus::Done,
                priority: TaskPriority::High,
                category: Some(TaskCategory::Design),
                assignee: Some(1),
                due_in_days: None,
                comment: Some("Approved by marketing."),
            },
            DemoTask {
                title: "Build signup flow",
                description: "Form validation and role selection.",
                status: TaskStatus::InProgress,
                priority: TaskPriority::High,
                category: Some(TaskCategory::Development),
                assignee: Some(2),
                due_in_days: Some(7),
                comment: Some("Validation is done, wiring up redirects next."),
            },
            DemoTask {
                title: "Cross-browser testing",
                description: "",
                status: TaskStatus::Todo,
                priority: TaskPriority::Medium,
                category: Some(TaskCategory::Qa),
                assignee: None,
                due_in_days: Some(14),
                comment: None,
            },
        ],
    },
    DemoProject {
        name: "Mobile App",
        description: "First release of the companion app.",
        due_in_days: None,
        tasks: &[
            DemoTask {
                title: "Pick a navigation pattern",
                description: "Tabs or drawer.",
                status: TaskStatus::Todo,
                priority: TaskPriority::Low,
                category: Some(TaskCategory::Design),
                assignee: Some(2),
                due_in_days: None,
                comment: None,
            },
            DemoTask {
                title: "Set up push notifications",
                description: "Waiting on store credentials.",
                status: TaskStatus::Blocked,
                priority: TaskPriority::Medium,
                category: Some(TaskCategory::Development),
                assignee: Some(1),
                due_in_days: Some(21),
                comment: Some("Blocked until the developer account is approved."),
            },
        ],
    },
];

fn due_date(days: Option<u64>) -> Option<NaiveDate> {
    days.and_then(|d| Utc::now().date_naive().checked_add_days(Days::new(d)))
}

/// Seed demo users, projects, tasks and comments.
///
/// Every demo account gets `password`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or any insert fails.
pub async fn demo(password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    let users = seed_users(&pool, password).await?;
    info!(users = users.len(), "Users ready");

    let projects = ProjectRepository::new(&pool);
    if projects.count().await? > 0 {
        info!("Projects already exist, skipping project seed");
        return Ok(());
    }

    let admin = users.first().copied();
    for demo in &PROJECTS {
        let project = projects
            .create(&NewProject {
                name: demo.name.to_string(),
                description: demo.description.to_string(),
                owner_id: admin,
                due_date: due_date(demo.due_in_days),
            })
            .await?;
        info!(project_id = %project.id, "Created project {}", project.name);

        seed_tasks(&pool, project.id, demo.tasks, &users).await?;
    }

    info!("Seeding complete!");
    Ok(())
}

async fn seed_users(
    pool: &PgPool,
    password: &str,
) -> Result<Vec<UserId>, Box<dyn std::error::Error>> {
    let auth = AuthService::new(pool);
    let repo = UserRepository::new(pool);
    let mut ids = Vec::with_capacity(USERS.len());

    for (full_name, email, role) in USERS {
        match auth.register(full_name, email, password, role).await {
            Ok(user) => ids.push(user.id),
            Err(AuthError::UserAlreadyExists) => {
                let existing = repo
                    .get_by_email(&Email::parse(email)?)
                    .await?
                    .ok_or_else(|| format!("user {email} vanished during seeding"))?;
                info!("Reusing existing user {email}");
                ids.push(existing.id);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(ids)
}

async fn seed_tasks(
    pool: &PgPool,
    project_id: ProjectId,
    demos: &[DemoTask],
    users: &[UserId],
) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = TaskRepository::new(pool);
    let comments = CommentRepository::new(pool);

    for demo in demos {
        let assignee = demo.assignee.and_then(|i| users.get(i).copied());
        let task = tasks
            .create(&NewTask {
                project_id,
                title: demo.title.to_string(),
                description: demo.description.to_string(),
                assigned_to: assignee,
                priority: demo.priority,
                category: demo.category,
                due_date: due_date(demo.due_in_days),
            })
            .await?;

        if demo.status != TaskStatus::Todo {
            tasks.update_status(task.id, demo.status).await?;
        }

        let author = assignee.or_else(|| users.first().copied());
        if let (Some(content), Some(author)) = (demo.comment, author) {
            comments.create(task.id, author, content).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_assignees_exist() {
        for project in &PROJECTS {
            for task in project.tasks {
                assert!(task.assignee.is_none_or(|i| i < USERS.len()));
            }
        }
    }

    #[test]
    fn test_demo_covers_every_column() {
        let statuses: Vec<TaskStatus> = PROJECTS
            .iter()
            .flat_map(|p| p.tasks.iter().map(|t| t.status))
            .collect();
        for status in [
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Blocked,
        ] {
            assert!(statuses.contains(&status));
        }
    }

    #[test]
    fn test_due_date_offsets_from_today() {
        assert_eq!(due_date(None), None);
        assert!(due_date(Some(7)).is_some_and(|d| d > Utc::now().date_naive()));
    }
}
