//! Task domain types.

use chrono::{DateTime, NaiveDate, Utc};

use plooma_core::{
    BoardItem, ProjectId, TaskCategory, TaskId, TaskPriority, TaskStatus, UserId,
};

use super::UNKNOWN;

/// Shown for a task without a due date.
pub const NO_DUE_DATE: &str = "No due date";

/// A board task (domain type).
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: Option<UserId>,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub category: Option<TaskCategory>,
    /// Order within the project board.
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Due date as text, falling back to "No due date".
    #[must_use]
    pub fn due_label(&self) -> String {
        self.due_date
            .map_or_else(|| NO_DUE_DATE.to_string(), |d| d.to_string())
    }
}

impl BoardItem for Task {
    fn status(&self) -> TaskStatus {
        self.status
    }

    fn category(&self) -> Option<TaskCategory> {
        self.category
    }

    fn assignee(&self) -> Option<UserId> {
        self.assigned_to
    }
}

/// A task in a member's queue, with the name of its project.
#[derive(Debug, Clone)]
pub struct AssignedTask {
    pub task: Task,
    pub project_name: Option<String>,
}

impl AssignedTask {
    #[must_use]
    pub fn project(&self) -> &str {
        self.project_name.as_deref().unwrap_or(UNKNOWN)
    }
}

/// Fields for creating a task. Status always starts at `todo`.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub assigned_to: Option<UserId>,
    pub priority: TaskPriority,
    pub category: Option<TaskCategory>,
    pub due_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(due_date: Option<NaiveDate>) -> Task {
        Task {
            id: TaskId::new(1),
            project_id: ProjectId::new(1),
            title: "Write copy".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            assigned_to: None,
            due_date,
            priority: TaskPriority::default(),
            category: None,
            position: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_due_label() {
        assert_eq!(task(None).due_label(), "No due date");
        let due = NaiveDate::from_ymd_opt(2025, 3, 14);
        assert_eq!(task(due).due_label(), "2025-03-14");
    }

    #[test]
    fn test_assigned_task_project_fallback() {
        let assigned = AssignedTask {
            task: task(None),
            project_name: None,
        };
        assert_eq!(assigned.project(), "Unknown");
    }
}
