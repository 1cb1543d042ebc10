//! Durable key-value state.
//!
//! A flat string-to-string map persisted as pretty JSON. Every update is
//! written through immediately. `update_many` applies several keys under one
//! lock and one file write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cirrus_common::ConfigError;
use tracing::{debug, warn};

use crate::toml_writer::atomic_write;

/// String key-value storage that survives process restarts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, or remove it when `value` is `None`.
    fn update(&self, key: &str, value: Option<&str>) -> Result<(), ConfigError> {
        self.update_many(&[(key, value)])
    }

    /// Apply every entry as one write. A `None` value removes the key.
    fn update_many(&self, entries: &[(&str, Option<&str>)]) -> Result<(), ConfigError>;
}

fn apply(values: &mut BTreeMap<String, String>, entries: &[(&str, Option<&str>)]) {
    for (key, value) in entries {
        match value {
            Some(v) => values.insert((*key).to_string(), (*v).to_string()),
            None => values.remove(*key),
        };
    }
}

/// Default location of the state file (`<data dir>/cirrus/state.json`).
pub fn default_state_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::data_dir()
        .ok_or_else(|| ConfigError::StateError("could not determine data directory".into()))?;
    Ok(base.join("cirrus").join("state.json"))
}

/// JSON file backed store.
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts empty; an unreadable
    /// or corrupt file is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), "ignoring corrupt state file: {e}");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), "failed to read state file: {e}");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), keys = values.len(), "state store opened");
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| ConfigError::StateError(format!("failed to serialize state: {e}")))?;
        atomic_write(&self.path, json.as_bytes()).map_err(|e| {
            ConfigError::StateError(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.get(key).cloned()
    }

    fn update_many(&self, entries: &[(&str, Option<&str>)]) -> Result<(), ConfigError> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        let mut next = values.clone();
        apply(&mut next, entries);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.get(key).cloned()
    }

    fn update_many(&self, entries: &[(&str, Option<&str>)]) -> Result<(), ConfigError> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        apply(&mut values, entries);
        Ok(())
    }
}
