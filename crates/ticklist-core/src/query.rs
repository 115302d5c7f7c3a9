//! View-time filtering, searching and sorting over a task list.
//!
//! Nothing here mutates or reorders the stored collection; every function
//! returns borrowed views in a fresh `Vec`.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::tasks::{Priority, Task, TaskStatus};

/// Which tasks a listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Status(TaskStatus),
    HighPriority,
    Overdue,
    DueToday,
}

impl TaskFilter {
    /// Whether `task` passes, with `today` as the reference day.
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Status(status) => task.status == *status,
            TaskFilter::HighPriority => task.priority == Priority::High,
            TaskFilter::Overdue => task.is_overdue_as_of(today),
            TaskFilter::DueToday => task.is_due_on(today),
        }
    }
}

/// Ordering applied to a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Earliest due first; undated tasks last.
    #[default]
    DueDate,
    /// High, Medium, Low.
    Priority,
    /// Oldest first.
    CreatedDate,
    /// Case-insensitive.
    Title,
}

impl SortKey {
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortKey::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortKey::CreatedDate => a.created_at.cmp(&b.created_at),
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

/// Search, filter and sort settings for one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub search: Option<String>,
    pub filter: TaskFilter,
    pub sort: SortKey,
}

/// Case-insensitive substring match on title, description or any tag.
/// A blank term matches everything.
pub fn matches_search(task: &Task, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(&term)
        || task.description.to_lowercase().contains(&term)
        || task.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
}

/// Run `query` over `tasks` as of `today`. The sort is stable.
pub fn run<'a>(tasks: &'a [Task], query: &TaskQuery, today: NaiveDate) -> Vec<&'a Task> {
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|task| {
            query
                .search
                .as_deref()
                .is_none_or(|term| matches_search(task, term))
        })
        .filter(|task| query.filter.matches(task, today))
        .collect();
    view.sort_by(|a, b| query.sort.compare(a, b));
    view
}
