use chrono::NaiveDate;
use serde::Serialize;
use ticklist_core::tasks::{Priority, Task, TaskStatus};

/// Aggregate counts over the current tasks and drafts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub priority: PriorityCounts,
    pub overdue: usize,
    pub due_today: usize,
    pub draft_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    #[serde(rename = "Low")]
    pub low: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "High")]
    pub high: usize,
}

impl Statistics {
    pub(crate) fn compute(tasks: &[Task], draft_count: usize, today: NaiveDate) -> Self {
        let mut stats = Statistics {
            total: tasks.len(),
            draft_count,
            ..Statistics::default()
        };
        for task in tasks {
            match task.status {
                TaskStatus::Todo => stats.todo += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
            match task.priority {
                Priority::Low => stats.priority.low += 1,
                Priority::Medium => stats.priority.medium += 1,
                Priority::High => stats.priority.high += 1,
            }
            if task.is_overdue_as_of(today) {
                stats.overdue += 1;
            }
            if task.is_due_on(today) {
                stats.due_today += 1;
            }
        }
        stats
    }

    pub fn status_count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }

    pub fn priority_count(&self, priority: Priority) -> usize {
        match priority {
            Priority::Low => self.priority.low,
            Priority::Medium => self.priority.medium,
            Priority::High => self.priority.high,
        }
    }
}
