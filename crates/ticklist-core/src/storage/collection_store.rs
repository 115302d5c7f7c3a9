use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::error;

/// Errors produced when persisting a collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying storage failure (I/O, permissions, full disk).
    #[error("storage failure: {reason}")]
    Storage { reason: String },
    /// Records could not be serialised.
    #[error("encode failure: {reason}")]
    Encode { reason: String },
}

/// Contract for a store holding one whole collection of records.
///
/// Loading never fails: missing or corrupt data is recovered by the store
/// and surfaces as an empty collection. Saving overwrites the collection in
/// full and reports failure to the caller after logging it.
pub trait CollectionStore<T>: Send + Sync {
    /// Read the whole collection.
    fn load(&self) -> Vec<T>;

    /// Replace the whole collection.
    fn save(&self, records: &[T]) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral sessions.
///
/// Clones share the same backing collection, so a test can keep a handle
/// and inspect what was written.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    inner: Arc<Mutex<Vec<T>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            fail_writes: Arc::clone(&self.fail_writes),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::with_records(Vec::new())
    }
}

impl<T> InMemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(records)),
            fail_writes: Arc::new(Mutex::new(false)),
        }
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    fn writes_fail(&self) -> bool {
        self.fail_writes.lock().map(|flag| *flag).unwrap_or(true)
    }
}

impl<T: Clone + Send> CollectionStore<T> for InMemoryStore<T> {
    fn load(&self) -> Vec<T> {
        match self.inner.lock() {
            Ok(records) => records.clone(),
            Err(err) => {
                error!("in-memory store lock poisoned, starting empty: {err}");
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[T]) -> Result<(), StoreError> {
        if self.writes_fail() {
            let err = StoreError::Storage {
                reason: "writes disabled".to_string(),
            };
            error!("error saving collection: {err}");
            return Err(err);
        }
        let mut stored = self.inner.lock().map_err(|err| StoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        *stored = records.to_vec();
        Ok(())
    }
}
