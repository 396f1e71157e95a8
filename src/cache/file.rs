//! On-disk cache backend.
//!
//! Each entry is one JSON file named after its key, carrying an absolute
//! expiry timestamp so several processes can share the directory. Writes go
//! through a temporary file and a rename, so readers never see a partial
//! entry.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CacheBackend, CacheError, CacheKey};

const ENTRY_EXTENSION: &str = "json";

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: CacheKey,
    /// `None` when the ttl runs past the representable date range.
    expires_at: Option<DateTime<Utc>>,
    value: Value,
}

/// Directory-backed cache.
pub struct FileCache {
    directory: PathBuf,
}

impl FileCache {
    /// Use `directory` for entries. It is created on first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let name = key.as_str().replace(':', "-");
        self.directory.join(format!("{name}.{ENTRY_EXTENSION}"))
    }

    fn remove_quietly(path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "failed to remove cache file");
            }
        }
    }
}

impl CacheBackend for FileCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: StoredEntry = serde_json::from_slice(&bytes)?;
        if entry.key != *key {
            return Err(CacheError::Backend(format!(
                "{} holds a different key",
                path.display()
            )));
        }
        if entry.expires_at.is_some_and(|at| at <= Utc::now()) {
            Self::remove_quietly(&path);
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    fn put(&self, key: &CacheKey, value: Value, ttl: Duration) -> Result<(), CacheError> {
        fs::create_dir_all(&self.directory)?;

        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        let entry = StoredEntry {
            key: key.clone(),
            expires_at,
            value,
        };

        let path = self.entry_path(key);
        let tmp = path.with_extension(format!("{}.tmp", std::process::id()));
        fs::write(&tmp, serde_json::to_vec(&entry)?)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            Self::remove_quietly(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn exists(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(ENTRY_EXTENSION) {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
