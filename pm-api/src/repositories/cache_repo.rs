use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;

use crate::domain::{migrate_bundle, models::StateBundle};

use super::CacheError;

const STATE_KEY: &str = "app-state";

/// File-backed key-value store: one JSON document per key under a
/// configured directory. Serves as the offline fallback when the remote is
/// unreachable and as a write-through cache alongside every remote write.
/// Unbounded, no eviction.
#[derive(Debug, Clone)]
pub struct LocalCacheRepository {
    dir: PathBuf,
}

impl LocalCacheRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn read(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let text = match fs::read_to_string(self.entry_path(key)) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = serde_json::from_str(&text).map_err(|e| CacheError::Malformed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(value))
    }

    pub fn write(&self, key: &str, value: &Value) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(value).map_err(|e| CacheError::Malformed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        fs::write(self.entry_path(key), text)?;
        Ok(())
    }

    /// Last known-good snapshot, migrated to the current shape.
    pub fn read_bundle(&self) -> Result<Option<StateBundle>, CacheError> {
        let Some(mut value) = self.read(STATE_KEY)? else {
            return Ok(None);
        };

        migrate_bundle(&mut value);
        let bundle = serde_json::from_value(value).map_err(|e| CacheError::Malformed {
            key: STATE_KEY.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(bundle))
    }

    pub fn write_bundle(&self, bundle: &StateBundle) -> Result<(), CacheError> {
        let value = serde_json::to_value(bundle).map_err(|e| CacheError::Malformed {
            key: STATE_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.write(STATE_KEY, &value)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}
