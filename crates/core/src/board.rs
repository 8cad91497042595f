//! Project board grouping.
//!
//! A project page shows its tasks in status columns, filtered by a category
//! tab, with a small statistics header computed over the unfiltered list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{TaskCategory, TaskStatus, UserId};

/// What the board needs to know about a task.
pub trait BoardItem {
    fn status(&self) -> TaskStatus;
    fn category(&self) -> Option<TaskCategory>;
    fn assignee(&self) -> Option<UserId>;
}

/// Category tab above the board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoardTab {
    #[default]
    All,
    Design,
    Development,
    #[serde(rename = "QA")]
    Qa,
    Completed,
}

impl BoardTab {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Design,
        Self::Development,
        Self::Qa,
        Self::Completed,
    ];

    /// Read the `tab` query parameter. Unknown or missing values select `All`.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("Design") => Self::Design,
            Some("Development") => Self::Development,
            Some("QA") => Self::Qa,
            Some("Completed") => Self::Completed,
            _ => Self::All,
        }
    }

    /// Query value and visible label; they are the same string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Design => "Design",
            Self::Development => "Development",
            Self::Qa => "QA",
            Self::Completed => "Completed",
        }
    }

    /// Whether a task is visible under this tab.
    pub fn matches<T: BoardItem + ?Sized>(self, item: &T) -> bool {
        match self {
            Self::All => true,
            Self::Completed => item.status().is_done(),
            Self::Design => item.category() == Some(TaskCategory::Design),
            Self::Development => item.category() == Some(TaskCategory::Development),
            Self::Qa => item.category() == Some(TaskCategory::Qa),
        }
    }
}

/// One status column of the board.
#[derive(Debug)]
pub struct BoardColumn<'a, T> {
    pub status: TaskStatus,
    pub items: Vec<&'a T>,
}

impl<T> BoardColumn<'_, T> {
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Tasks grouped by status after tab filtering.
///
/// Input order is preserved inside every column, so callers pass tasks
/// already sorted by board position.
#[derive(Debug)]
pub struct Board<'a, T> {
    pub tab: BoardTab,
    pub todo: Vec<&'a T>,
    pub in_progress: Vec<&'a T>,
    pub done: Vec<&'a T>,
    pub blocked: Vec<&'a T>,
}

impl<'a, T: BoardItem> Board<'a, T> {
    #[must_use]
    pub fn group(items: &'a [T], tab: BoardTab) -> Self {
        let mut board = Self {
            tab,
            todo: Vec::new(),
            in_progress: Vec::new(),
            done: Vec::new(),
            blocked: Vec::new(),
        };

        for item in items.iter().filter(|item| tab.matches(*item)) {
            match item.status() {
                TaskStatus::Todo => board.todo.push(item),
                TaskStatus::InProgress => board.in_progress.push(item),
                TaskStatus::Done => board.done.push(item),
                TaskStatus::Blocked => board.blocked.push(item),
            }
        }

        board
    }

    /// Columns in display order. The blocked column only appears when it
    /// has something in it.
    #[must_use]
    pub fn columns(&self) -> Vec<BoardColumn<'a, T>> {
        let mut columns = vec![
            BoardColumn {
                status: TaskStatus::Todo,
                items: self.todo.clone(),
            },
            BoardColumn {
                status: TaskStatus::InProgress,
                items: self.in_progress.clone(),
            },
            BoardColumn {
                status: TaskStatus::Done,
                items: self.done.clone(),
            },
        ];
        if !self.blocked.is_empty() {
            columns.push(BoardColumn {
                status: TaskStatus::Blocked,
                items: self.blocked.clone(),
            });
        }
        columns
    }

    /// Number of tasks visible under the current tab.
    #[must_use]
    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len() + self.blocked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Header statistics for a project board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub completed: usize,
    pub active_members: usize,
    pub progress_percent: u8,
}

impl BoardStats {
    /// Compute stats over every task of the project, ignoring the active tab.
    #[must_use]
    pub fn compute<T: BoardItem>(items: &[T]) -> Self {
        let total = items.len();
        let completed = items.iter().filter(|i| i.status().is_done()).count();
        let active_members = items
            .iter()
            .filter_map(BoardItem::assignee)
            .collect::<HashSet<_>>()
            .len();

        Self {
            total,
            completed,
            active_members,
            progress_percent: percent(completed, total),
        }
    }
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    u8::try_from(part.saturating_mul(100) / whole).unwrap_or(100)
}
