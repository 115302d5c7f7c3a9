use std::path::PathBuf;

use crate::config::Config;
use color_eyre::Result;
use dirs::data_dir;
use ticklist_core::tasks::{Draft, Task};
use ticklist_storage::JsonFileStore;
use ticklist_task::TaskManager;
use tracing::debug;

/// Task manager over the two JSON collection files.
pub type FileTaskManager = TaskManager<JsonFileStore<Task>, JsonFileStore<Draft>>;

/// Resolve the default data directory for Ticklist.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("ticklist"))
}

/// Open both collections named by `config`, creating missing files.
pub fn open_manager(config: &Config) -> Result<FileTaskManager> {
    let tasks = config.tasks_path()?;
    let drafts = config.drafts_path()?;
    debug!(?tasks, ?drafts, "opening task manager");
    Ok(TaskManager::new(
        JsonFileStore::new(tasks),
        JsonFileStore::new(drafts),
    ))
}
