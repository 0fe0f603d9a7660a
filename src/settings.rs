//! Free-form settings document.
//!
//! Kept in its own file with its own lock; nothing here touches the times
//! document. The store does not interpret the contents beyond requiring a
//! JSON object.

use crate::error::{Result, StoreError};
use crate::fsutil::{self, FileLock};
use crate::types::json_type_name;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings written on first run.
pub fn default_settings() -> Map<String, Value> {
    match json!({
        "language": "en",
        "enabledFeatures": {
            "inspectionTimer": true,
            "saveUnknownSolves": true
        },
        "timerDisplayDuration": 1500,
        "inspectionTime": 15,
        "inspectionDelay": 200
    }) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub struct SettingsStore {
    path: PathBuf,
    lock_path: PathBuf,
    pretty: bool,
    access: RwLock<()>,
}

impl SettingsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let lock_path = fsutil::sibling(&path, "lock");
        Self {
            path,
            lock_path,
            pretty: true,
            access: RwLock::new(()),
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Seed [`default_settings`] if the file does not exist.
    pub fn initialize_if_absent(&self) -> Result<bool> {
        let _guard = self.access.write();
        let _file_lock = FileLock::exclusive(&self.lock_path)?;

        match fs::metadata(&self.path) {
            Ok(_) => Ok(false),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.write(&default_settings())?;
                info!(path = %self.path.display(), "seeded settings document");
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self) -> Result<Map<String, Value>> {
        let _guard = self.access.read();
        let _file_lock = FileLock::shared(&self.lock_path)?;

        let bytes = fs::read(&self.path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Corruption(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Overwrite all settings. The payload must be a JSON object.
    pub fn replace(&self, settings: Value) -> Result<()> {
        let settings = match settings {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidPayload(format!(
                    "settings payload must be an object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let _guard = self.access.write();
        let _file_lock = FileLock::exclusive(&self.lock_path)?;
        self.write(&settings)
    }

    fn write(&self, settings: &Map<String, Value>) -> Result<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(settings)?
        } else {
            serde_json::to_vec(settings)?
        };
        fsutil::write_atomic(&self.path, &bytes)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "persisted settings");
        Ok(())
    }
}
