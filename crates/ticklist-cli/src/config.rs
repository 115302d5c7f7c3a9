use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::storage;

pub const DEFAULT_TASKS_FILE: &str = "todos.json";
pub const DEFAULT_DRAFTS_FILE: &str = "drafts.json";

/// User-level configuration loaded from `~/.config/ticklist/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the directory holding both collection files.
    pub data_dir: Option<PathBuf>,
    /// File name of the task collection inside `data_dir`.
    pub tasks_file: Option<String>,
    /// File name of the draft collection inside `data_dir`.
    pub drafts_file: Option<String>,
}

impl Config {
    /// Copy of this config with `--data-dir` applied, if given. The override
    /// is for this run only and never written back.
    pub fn with_data_dir(&self, dir: Option<PathBuf>) -> Config {
        Config {
            data_dir: dir.or_else(|| self.data_dir.clone()),
            ..self.clone()
        }
    }

    /// Directory holding the collection files.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => storage::default_data_dir(),
        }
    }

    pub fn tasks_path(&self) -> Result<PathBuf> {
        let name = self.tasks_file.as_deref().unwrap_or(DEFAULT_TASKS_FILE);
        Ok(self.data_dir()?.join(name))
    }

    pub fn drafts_path(&self) -> Result<PathBuf> {
        let name = self.drafts_file.as_deref().unwrap_or(DEFAULT_DRAFTS_FILE);
        Ok(self.data_dir()?.join(name))
    }
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("ticklist").join("config.toml"))
}

/// Write `config` to `path`, creating parent directories as needed.
/// An existing file is left untouched to avoid clobbering user edits.
pub fn write_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}
