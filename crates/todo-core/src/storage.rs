//! Synchronous key-value persistence boundary.
//!
//! [`TodoStore`](crate::store::TodoStore) only ever talks to a
//! [`KeyValueStore`]: one `get` at load, one `set` per effective mutation.
//! Two backends ship here:
//!
//! - [`FileStore`]: one `<key>.json` file per key inside a data directory,
//!   replaced atomically (write to a sibling temp file, then rename).
//! - [`MemoryStore`]: a `HashMap` for tests and embedding.

use crate::error::StorageError;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Key under which the to-do list blob is stored.
pub const STORAGE_KEY: &str = "todos";

/// Minimal string key-value store.
pub trait KeyValueStore {
    /// Read the value for `key`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend exists but cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be durably written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Move an unreadable value out of `key` so later reads see nothing.
    ///
    /// Returns where the original was kept, if the backend keeps it at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be moved aside.
    fn quarantine(&mut self, key: &str) -> Result<Option<PathBuf>, StorageError>;
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// File-per-key store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write_atomic(&self, path: &Path, value: &str) -> Result<(), StorageError> {
        let tmp = path.with_extension("json.tmp");
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, path)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StorageError::io(path, e)
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        match fs::read(&path) {
            // Invalid UTF-8 is handed on lossily so the decoder rejects it as corrupt.
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        self.write_atomic(&path, value)?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "wrote blob");
        Ok(())
    }

    fn quarantine(&mut self, key: &str) -> Result<Option<PathBuf>, StorageError> {
        validate_key(key)?;
        let from = self.path_for(key);
        let stamp = chrono::Utc::now().timestamp_millis();
        let to = self.dir.join(format!("{key}.corrupt-{stamp}"));
        // Rename keeps the original bytes, including any invalid UTF-8.
        match fs::rename(&from, &to) {
            Ok(()) => Ok(Some(to)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(from, e)),
        }
    }
}

/// In-memory store. Counts writes so callers can observe persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `value` under `key`.
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.into());
        store
    }

    /// Number of successful `set` calls so far.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn quarantine(&mut self, key: &str) -> Result<Option<PathBuf>, StorageError> {
        self.values.remove(key);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_set_then_get() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set(STORAGE_KEY, "[]").unwrap();
        assert_eq!(store.get(STORAGE_KEY).unwrap().as_deref(), Some("[]"));
        assert!(store.path_for(STORAGE_KEY).exists());
    }

    #[test]
    fn file_store_set_replaces_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set(STORAGE_KEY, "first").unwrap();
        store.set(STORAGE_KEY, "second").unwrap();
        assert_eq!(store.get(STORAGE_KEY).unwrap().as_deref(), Some("second"));

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["todos.json".to_string()]);
    }

    #[test]
    fn file_store_creates_nested_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");
        let mut store = FileStore::open(&nested).unwrap();
        store.set(STORAGE_KEY, "[]").unwrap();
        assert!(nested.join("todos.json").exists());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn file_store_quarantine_moves_original_bytes() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let bytes = [0xff, 0xfe, b'{', b'n', b'o'];
        fs::write(store.path_for(STORAGE_KEY), bytes).unwrap();

        let path = store.quarantine(STORAGE_KEY).unwrap().unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(fs::read(path).unwrap(), bytes);
        assert!(!store.path_for(STORAGE_KEY).exists());
        assert_eq!(store.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_quarantine_of_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.quarantine(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_invalid_utf8_is_returned_lossily() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        fs::write(store.path_for(STORAGE_KEY), [0xff, 0xfe, b'[']).unwrap();
        let value = store.get(STORAGE_KEY).unwrap().unwrap();
        assert!(value.contains('\u{fffd}'));
    }

    #[test]
    fn memory_store_counts_writes() {
        let mut store = MemoryStore::with_value(STORAGE_KEY, "[]");
        assert_eq!(store.writes(), 0);
        store.set(STORAGE_KEY, "[1]").unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(store.get(STORAGE_KEY).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn memory_store_quarantine_drops_value() {
        let mut store = MemoryStore::with_value(STORAGE_KEY, "garbage");
        assert_eq!(store.quarantine(STORAGE_KEY).unwrap(), None);
        assert_eq!(store.get(STORAGE_KEY).unwrap(), None);
        assert_eq!(store.writes(), 0);
    }
}
