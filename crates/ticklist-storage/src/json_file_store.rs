use std::{
    fs, io,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Serializer, Value};
use ticklist_core::storage::{CollectionStore, StoreError};
use tracing::{debug, error, instrument, warn};

const EMPTY_COLLECTION: &[u8] = b"[]";

/// File-backed store keeping one collection as a top-level JSON array.
///
/// Missing, empty and corrupt files are replaced with `[]`. Array elements
/// that do not decode as `T` are held back from `load` but kept verbatim and
/// appended on every `save`, so they are never lost from the file.
///
/// Writes overwrite the file in place: there is no locking and no atomic
/// rename, so concurrent writers from several processes are unsupported.
pub struct JsonFileStore<T> {
    path: PathBuf,
    unreadable: Mutex<Vec<Value>>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            unreadable: Mutex::new(Vec::new()),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of elements from the last load that were kept but not decoded.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    fn reset(&self) {
        self.keep_unreadable(Vec::new());
        if let Err(err) = write_bytes(&self.path, EMPTY_COLLECTION) {
            error!("error resetting collection file: {err}");
        }
    }

    fn keep_unreadable(&self, rows: Vec<Value>) {
        match self.unreadable.lock() {
            Ok(mut guard) => *guard = rows,
            Err(poisoned) => *poisoned.into_inner() = rows,
        }
    }

    fn unreadable_rows(&self) -> Vec<Value> {
        match self.unreadable.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl<T: Serialize + DeserializeOwned> CollectionStore<T> for JsonFileStore<T> {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn load(&self) -> Vec<T> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("collection file missing, creating it");
                self.reset();
                return Vec::new();
            }
            Err(err) => {
                error!("error loading data: {err}");
                return Vec::new();
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            warn!("collection file is empty, resetting it");
            self.reset();
            return Vec::new();
        }

        let values: Vec<Value> = match serde_json::from_slice(&bytes) {
            Ok(values) => values,
            Err(err) => {
                error!("error decoding collection file, creating a new one: {err}");
                self.reset();
                return Vec::new();
            }
        };

        let (records, unreadable) = decode_records(values);
        debug!(
            count = records.len(),
            unreadable = unreadable.len(),
            "loaded collection"
        );
        self.keep_unreadable(unreadable);
        records
    }

    #[instrument(skip_all, fields(path = %self.path.display(), count = records.len()))]
    fn save(&self, records: &[T]) -> Result<(), StoreError> {
        let unreadable = self.unreadable_rows();
        let result =
            encode(records, &unreadable).and_then(|json| write_bytes(&self.path, &json));
        if let Err(err) = &result {
            error!("error saving data: {err}");
        }
        result
    }
}

/// Split `values` into decoded records and the raw elements that failed.
fn decode_records<T: DeserializeOwned>(values: Vec<Value>) -> (Vec<T>, Vec<Value>) {
    let mut records = Vec::with_capacity(values.len());
    let mut unreadable = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        match T::deserialize(&value) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(index, "keeping unreadable record as-is: {err}");
                unreadable.push(value);
            }
        }
    }
    (records, unreadable)
}

/// One element of the written array.
#[derive(Serialize)]
#[serde(untagged)]
enum Row<'a, T> {
    Record(&'a T),
    Raw(&'a Value),
}

fn encode<T: Serialize>(records: &[T], unreadable: &[Value]) -> Result<Vec<u8>, StoreError> {
    let rows: Vec<Row<'_, T>> = records
        .iter()
        .map(Row::Record)
        .chain(unreadable.iter().map(Row::Raw))
        .collect();
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    rows.serialize(&mut serializer)
        .map_err(|e| StoreError::Encode {
            reason: e.to_string(),
        })?;
    Ok(buf)
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(storage_err)?;
    }
    fs::write(path, bytes).map_err(storage_err)
}

fn storage_err<E: ToString>(err: E) -> StoreError {
    StoreError::Storage {
        reason: err.to_string(),
    }
}
