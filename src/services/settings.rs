//! JSON file-backed local settings for fast startup reads

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::warn;

/// Errors raised while persisting settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Well-known settings keys
pub mod keys {
    pub const SUBSCRIBED: &str = "subscribed";
    pub const LAST_USER_ID: &str = "last_user_id";
}

struct SettingsInner {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

/// A small key-value cache mirrored to a JSON file.
///
/// Cloning shares the underlying file; writes rewrite the file atomically
/// via a temp-file rename.
#[derive(Clone)]
pub struct LocalSettings {
    inner: Arc<SettingsInner>,
}

impl LocalSettings {
    /// Open (or create) the settings file at `path`.
    ///
    /// An unreadable or corrupt file starts empty rather than failing: the
    /// cache only ever holds values that can be re-derived.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();

        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(map) => map,
                Err(err) => {
                    warn!("settings file {} is corrupt, starting empty: {err}", path.display());
                    Map::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            inner: Arc::new(SettingsInner {
                path,
                values: Mutex::new(values),
            }),
        })
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), SettingsError> {
        let tmp = self.inner.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        std::fs::rename(&tmp, &self.inner.path)?;
        Ok(())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut values = self.inner.values.lock().expect("settings lock poisoned");
        values.insert(key.to_string(), value);
        self.persist(&values)
    }

    fn get(&self, key: &str) -> Option<Value> {
        let values = self.inner.values.lock().expect("settings lock poisoned");
        values.get(key).cloned()
    }

    /// Read a boolean value
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Write a boolean value and persist it
    pub fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.set(key, Value::Bool(value))
    }

    /// Read a string value
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(str::to_string))
    }

    /// Write a string value and persist it
    pub fn set_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.set(key, Value::String(value.to_string()))
    }

    /// Remove a value and persist the removal
    pub fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let mut values = self.inner.values.lock().expect("settings lock poisoned");
        values.remove(key);
        self.persist(&values)
    }
}
