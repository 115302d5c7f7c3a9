//! Normalisation of user-entered text before it reaches the task manager.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("task title is required")]
    EmptyTitle,
}

/// Trim a title and reject it if nothing is left.
pub fn validate_title(raw: &str) -> Result<String, InputError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(InputError::EmptyTitle);
    }
    Ok(title.to_string())
}

/// Split comma-separated tags, trimming each and dropping empty pieces.
/// Order and duplicates are kept.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
