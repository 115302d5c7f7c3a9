//! The task manager: sole owner of the task and draft collections.
//!
//! Both collections are loaded once when the manager is built and every
//! mutation writes the whole affected collection back through its store.

mod stats;

use chrono::NaiveDate;
use ticklist_core::{
    query::{self, TaskQuery},
    storage::CollectionStore,
    tasks::{Draft, DraftPatch, NewTask, Priority, Task, TaskPatch, TaskStatus},
    time,
};
use tracing::{debug, error, instrument, warn};

pub use stats::{PriorityCounts, Statistics};

/// Task and draft repository backed by two `CollectionStore`s.
///
/// Not-found is reported through `Option`/`bool`, never as an error. A failed
/// write keeps the in-memory change and raises [`has_unsaved_changes`]; it is
/// neither rolled back nor retried.
///
/// [`has_unsaved_changes`]: TaskManager::has_unsaved_changes
pub struct TaskManager<TS, DS> {
    tasks: Vec<Task>,
    drafts: Vec<Draft>,
    task_store: TS,
    draft_store: DS,
    tasks_unsaved: bool,
    drafts_unsaved: bool,
}

impl<TS, DS> TaskManager<TS, DS>
where
    TS: CollectionStore<Task>,
    DS: CollectionStore<Draft>,
{
    pub fn new(task_store: TS, draft_store: DS) -> Self {
        let tasks = task_store.load();
        let drafts = draft_store.load();
        debug!(
            tasks = tasks.len(),
            drafts = drafts.len(),
            "task manager loaded"
        );
        Self {
            tasks,
            drafts,
            task_store,
            draft_store,
            tasks_unsaved: false,
            drafts_unsaved: false,
        }
    }

    fn persist_tasks(&mut self) {
        match self.task_store.save(&self.tasks) {
            Ok(()) => self.tasks_unsaved = false,
            Err(err) => {
                error!("tasks not persisted, keeping in-memory state: {err}");
                self.tasks_unsaved = true;
            }
        }
    }

    fn persist_drafts(&mut self) {
        match self.draft_store.save(&self.drafts) {
            Ok(()) => self.drafts_unsaved = false,
            Err(err) => {
                error!("drafts not persisted, keeping in-memory state: {err}");
                self.drafts_unsaved = true;
            }
        }
    }

    /// True while the last write of either collection failed.
    pub fn has_unsaved_changes(&self) -> bool {
        self.tasks_unsaved || self.drafts_unsaved
    }

    /// Append a new task. The title is stored as given; callers validate it.
    #[instrument(skip_all)]
    pub fn create_task(&mut self, fields: NewTask) -> Task {
        let task = Task::new(fields);
        debug!(id = %task.id, "creating task");
        self.tasks.push(task.clone());
        self.persist_tasks();
        task
    }

    #[instrument(skip_all)]
    pub fn create_draft(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Draft {
        let draft = Draft::new(title.into(), description.into(), tags);
        debug!(id = %draft.id, "creating draft");
        self.drafts.push(draft.clone());
        self.persist_drafts();
        draft
    }

    /// Apply `patch` to the task with `id`, keeping `completed_at` in step
    /// with the status.
    #[instrument(skip(self, patch))]
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.apply(patch);
        let updated = task.clone();
        self.persist_tasks();
        Some(updated)
    }

    #[instrument(skip(self, patch))]
    pub fn update_draft(&mut self, id: &str, patch: DraftPatch) -> Option<Draft> {
        let draft = self.drafts.iter_mut().find(|draft| draft.id == id)?;
        draft.apply(patch);
        let updated = draft.clone();
        self.persist_drafts();
        Some(updated)
    }

    #[instrument(skip(self))]
    pub fn delete_task(&mut self, id: &str) -> bool {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return false;
        };
        self.tasks.remove(index);
        self.persist_tasks();
        true
    }

    #[instrument(skip(self))]
    pub fn delete_draft(&mut self, id: &str) -> bool {
        let Some(index) = self.drafts.iter().position(|draft| draft.id == id) else {
            return false;
        };
        self.drafts.remove(index);
        self.persist_drafts();
        true
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn get_draft(&self, id: &str) -> Option<&Draft> {
        self.drafts.iter().find(|draft| draft.id == id)
    }

    /// All tasks in insertion order.
    pub fn list_tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// All drafts in insertion order.
    pub fn list_drafts(&self) -> &[Draft] {
        &self.drafts
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.status == status).collect()
    }

    pub fn tasks_by_priority(&self, priority: Priority) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.priority == priority)
            .collect()
    }

    pub fn tasks_by_tag(&self, tag: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.has_tag(tag)).collect()
    }

    /// Tasks whose due date falls on the current local day.
    pub fn tasks_due_today(&self) -> Vec<&Task> {
        self.tasks_due_on(time::today())
    }

    pub fn tasks_due_on(&self, day: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.is_due_on(day)).collect()
    }

    /// Open tasks due before the current local day.
    pub fn tasks_overdue(&self) -> Vec<&Task> {
        self.tasks_overdue_as_of(time::today())
    }

    pub fn tasks_overdue_as_of(&self, day: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.is_overdue_as_of(day))
            .collect()
    }

    /// Counts recomputed from the in-memory collections on every call.
    pub fn statistics(&self) -> Statistics {
        self.statistics_as_of(time::today())
    }

    pub fn statistics_as_of(&self, day: NaiveDate) -> Statistics {
        Statistics::compute(&self.tasks, self.drafts.len(), day)
    }

    /// Searched, filtered and sorted view of the tasks as of today.
    pub fn query(&self, params: &TaskQuery) -> Vec<&Task> {
        query::run(&self.tasks, params, time::today())
    }

    /// Turn a draft into a task: create the task from `fields`, then delete
    /// the draft. The two steps are not atomic; if the draft is already gone
    /// the new task is kept.
    #[instrument(skip(self, fields))]
    pub fn assign_draft(&mut self, draft_id: &str, fields: NewTask) -> Task {
        let task = self.create_task(fields);
        if !self.delete_draft(draft_id) {
            warn!(task_id = %task.id, "draft missing during assignment, task kept");
        }
        task
    }
}
