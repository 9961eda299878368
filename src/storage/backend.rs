//! Key/value backends for persisted records

use crate::validation::error::{RadarError, RadarResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// String records addressed by key
pub trait KeyValueStore {
    /// Stored value, `None` if the key was never written or was removed
    fn get(&self, key: &str) -> RadarResult<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> RadarResult<()>;

    /// Delete the record; removing a missing key is not an error
    fn remove(&self, key: &str) -> RadarResult<()>;
}

/// In-process store, contents are lost with the value
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> RadarResult<Option<String>> {
        Ok(self.records.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RadarResult<()> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RadarResult<()> {
        self.records.borrow_mut().remove(key);
        Ok(())
    }
}

/// Write a sibling temp file and rename it over `path`
fn write_atomically(tmp_path: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp_file = File::create(tmp_path)?;
    tmp_file.write_all(contents)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(tmp_path, path)
}

/// One `<key>.json` file per record inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on the first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> RadarResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(RadarError::storage(key, "record keys may only use [A-Za-z0-9._-]"));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> RadarResult<Option<String>> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RadarError::storage(
                key,
                format!("failed to read '{}': {}", path.display(), e),
            )),
        }
    }

    fn set(&self, key: &str, value: &str) -> RadarResult<()> {
        let path = self.record_path(key)?;
        let write_err = |e: std::io::Error| {
            RadarError::storage(key, format!("failed to write '{}': {}", path.display(), e))
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        let tmp_path = self.dir.join(format!(".{}.json.tmp", key));
        if let Err(e) = write_atomically(&tmp_path, &path, value.as_bytes()) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %tmp_path.display(), "failed to remove temp file: {}", cleanup);
                }
            }
            return Err(write_err(e));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> RadarResult<()> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RadarError::storage(
                key,
                format!("failed to remove '{}': {}", path.display(), e),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "[1]").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("[1]".to_string()));
        assert_eq!(store.len(), 1);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("records"));

        assert_eq!(store.get("bookmarks").unwrap(), None);

        store.set("bookmarks", "[]").unwrap();
        assert!(dir.path().join("records/bookmarks.json").exists());
        assert_eq!(store.get("bookmarks").unwrap(), Some("[]".to_string()));

        store.set("bookmarks", "[1,2]").unwrap();
        assert_eq!(store.get("bookmarks").unwrap(), Some("[1,2]".to_string()));

        store.remove("bookmarks").unwrap();
        assert_eq!(store.get("bookmarks").unwrap(), None);
        store.remove("bookmarks").unwrap();
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        // A directory in the record's place makes the final rename fail
        fs::create_dir(dir.path().join("bookmarks.json")).unwrap();

        let err = store.set("bookmarks", "[]").unwrap_err();
        assert!(matches!(err, RadarError::Storage { .. }));
        assert!(!dir.path().join(".bookmarks.json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = store.set(key, "[]").unwrap_err();
            assert!(matches!(err, RadarError::Storage { .. }), "key {:?}", key);
        }
    }
}
