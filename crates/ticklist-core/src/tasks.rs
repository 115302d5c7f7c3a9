use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time;

/// Task status lifecycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Label as persisted and shown to users.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Sort rank, most urgent first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Task entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::iso")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "time::iso_opt")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, with = "time::iso_opt")]
    pub completed_at: Option<NaiveDateTime>,
}

/// Parameters for a new task. `Default` matches the form defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDateTime>,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub status: TaskStatus,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Task {
    /// Build a task with a fresh id and creation time. `completed_at` starts
    /// empty whatever the initial status; only an update stamps it.
    pub fn new(fields: NewTask) -> Self {
        let now = time::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            created_at: now,
            due_date: fields.due_date,
            priority: fields.priority,
            status: fields.status,
            tags: fields.tags,
            completed_at: None,
        }
    }

    /// Calendar day the task is due, if any.
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.map(|due| due.date())
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_day() == Some(day)
    }

    /// Open and due strictly before `day`.
    pub fn is_overdue_as_of(&self, day: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_day().is_some_and(|due| due < day)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Apply present patch fields, then keep `completed_at` in step with `status`.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(status) = patch.status {
            self.status = status;
            if status != TaskStatus::Completed {
                self.completed_at = None;
            } else if self.completed_at.is_none() {
                self.completed_at = Some(time::now());
            }
        }
    }
}

/// Unscheduled task stub awaiting assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Draft {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::iso")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Draft {
    pub fn new(title: String, description: String, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            created_at: time::now(),
            tags,
        }
    }

    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
    }

    /// Task parameters seeded from this draft, for callers preparing an assignment.
    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            ..NewTask::default()
        }
    }
}

/// Partial update for a task. Absent fields are left untouched.
///
/// Deserialising rejects unknown keys, so a typo in a field name is an error
/// rather than a silent no-op.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `Some(None)` clears the due date.
    #[serde(default, deserialize_with = "time::deserialize_patch_timestamp")]
    pub due_date: Option<Option<NaiveDateTime>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial update for a draft.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DraftPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl DraftPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_task_uses_form_defaults() {
        let task = Task::new(NewTask::titled("Buy milk"));
        assert!(!task.id.is_empty());
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description, "");
        assert!(task.tags.is_empty());
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn serialises_with_original_labels() {
        let mut task = Task::new(NewTask::titled("Ship"));
        task.due_date = Some(day(2024, 6, 15).and_hms_opt(0, 0, 0).unwrap());
        let value = serde_json::to_value(&task).expect("serialise");
        assert_eq!(value["status"], "To Do");
        assert_eq!(value["priority"], "Medium");
        assert_eq!(value["due_date"], "2024-06-15T00:00:00");
        assert_eq!(value["completed_at"], serde_json::Value::Null);
    }

    #[test]
    fn reads_records_with_missing_optional_fields() {
        let task: Task = serde_json::from_value(json!({
            "id": "abc",
            "title": "Legacy",
            "created_at": "2024-06-01T08:00:00.123456",
            "due_date": "",
            "status": "In Progress"
        }))
        .expect("decode");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, None);
        assert!(task.tags.is_empty());
    }

    #[test]
    fn completing_stamps_and_reopening_clears() {
        let mut task = Task::new(NewTask::titled("Write report"));
        task.apply(TaskPatch::status(TaskStatus::Completed));
        let stamped = task.completed_at.expect("completed_at set");

        task.apply(TaskPatch::status(TaskStatus::Completed));
        assert_eq!(task.completed_at, Some(stamped));

        task.apply(TaskPatch::status(TaskStatus::InProgress));
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn patch_without_status_keeps_completion() {
        let mut task = Task::new(NewTask::titled("Done already"));
        task.apply(TaskPatch::status(TaskStatus::Completed));
        let stamped = task.completed_at;
        assert!(stamped.is_some());
        task.apply(TaskPatch {
            title: Some("Renamed".into()),
            ..TaskPatch::default()
        });
        assert_eq!(task.completed_at, stamped);
        assert_eq!(task.title, "Renamed");
    }

    #[test]
    fn patch_distinguishes_absent_and_null_due_date() {
        let untouched: TaskPatch = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert_eq!(untouched.due_date, None);

        let cleared: TaskPatch = serde_json::from_value(json!({"due_date": null})).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: TaskPatch = serde_json::from_value(json!({"due_date": "2024-06-20"})).unwrap();
        assert_eq!(
            set.due_date,
            Some(Some(day(2024, 6, 20).and_hms_opt(0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let err = serde_json::from_value::<TaskPatch>(json!({"stauts": "Completed"}))
            .expect_err("typo should be rejected");
        assert!(err.to_string().contains("stauts"));

        assert!(serde_json::from_value::<DraftPatch>(json!({"priority": "High"})).is_err());
    }

    #[test]
    fn overdue_ignores_completed_and_undated() {
        let today = day(2024, 6, 15);
        let mut task = Task::new(NewTask::titled("Late"));
        assert!(!task.is_overdue_as_of(today));

        task.due_date = day(2024, 6, 10).and_hms_opt(0, 0, 0);
        assert!(task.is_overdue_as_of(today));

        task.apply(TaskPatch::status(TaskStatus::Completed));
        assert!(!task.is_overdue_as_of(today));
    }

    #[test]
    fn draft_seeds_new_task() {
        let draft = Draft::new("Plan trip".into(), "flights".into(), vec!["travel".into()]);
        let fields = draft.to_new_task();
        assert_eq!(fields.title, "Plan trip");
        assert_eq!(fields.description, "flights");
        assert_eq!(fields.tags, vec!["travel".to_string()]);
        assert_eq!(fields.priority, Priority::Medium);
    }
}
