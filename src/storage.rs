//! Key-value persistence for the library and reading state.
//!
//! Values are JSON strings under short well-known keys. The on-disk store
//! keeps one `<key>.json` file per key inside a directory named by a hash of
//! the namespace label, so differently-configured data roots never collide.

use sha2::{Digest, Sha256};
#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Keys used across the crate. Values stored under each key are JSON.
pub mod keys {
    pub const BOOKS: &str = "books";
    pub const CURRENT_BOOK: &str = "current_book";
    pub const READING_POSITION: &str = "reading_position";
    pub const READING_PROGRESS: &str = "reading_progress";
}

/// Minimal string store. Writes are last-write-wins; failures are reported
/// through logging rather than the return type, so callers never stall on a
/// broken disk.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// File-backed store: one JSON file per key under a hashed namespace dir.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `data_dir`, namespaced by `label`. The
    /// directory is created lazily on first write.
    pub fn new(data_dir: &Path, label: &str) -> Self {
        Self {
            dir: namespace_dir(data_dir, label),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn namespace_dir(data_dir: &Path, label: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    data_dir.join(hash)
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(err) = fs::write(&path, value) {
            warn!(path = %path.display(), %err, "failed to persist value");
        }
    }

    fn remove(&mut self, key: &str) {
        let path = self.entry_path(key);
        if path.exists() {
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), %err, "failed to remove value");
            }
        }
    }
}

/// In-memory store for tests. Clones share one map, so a handle kept by the
/// test observes writes made through a clone moved into the code under test.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: std::rc::Rc<std::cell::RefCell<HashMap<String, String>>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trips_a_value() {
        let root = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(root.path(), "test");

        store.set(keys::BOOKS, "[1,2,3]");
        assert_eq!(store.get(keys::BOOKS).as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let root = TempDir::new().unwrap();
        let store = JsonFileStore::new(root.path(), "test");
        assert_eq!(store.get(keys::CURRENT_BOOK), None);
    }

    #[test]
    fn remove_clears_the_entry() {
        let root = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(root.path(), "test");

        store.set(keys::READING_POSITION, "4");
        store.remove(keys::READING_POSITION);
        assert_eq!(store.get(keys::READING_POSITION), None);
    }

    #[test]
    fn removing_an_absent_key_is_a_no_op() {
        let root = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(root.path(), "test");
        store.remove(keys::READING_PROGRESS);
        assert_eq!(store.get(keys::READING_PROGRESS), None);
    }

    #[test]
    fn entries_land_in_key_named_files_under_the_namespace() {
        let root = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(root.path(), "test");

        store.set(keys::BOOKS, "[]");
        let file = namespace_dir(root.path(), "test").join("books.json");
        assert!(file.is_file());
    }

    #[test]
    fn different_labels_use_disjoint_directories() {
        let root = TempDir::new().unwrap();
        let mut first = JsonFileStore::new(root.path(), "alpha");
        let second = JsonFileStore::new(root.path(), "beta");

        first.set(keys::BOOKS, "[]");
        assert_eq!(second.get(keys::BOOKS), None);
    }

    #[test]
    fn memory_store_overwrites_on_set() {
        let mut store = MemoryStore::new();
        store.set(keys::READING_POSITION, "1");
        store.set(keys::READING_POSITION, "2");
        assert_eq!(store.get(keys::READING_POSITION).as_deref(), Some("2"));
    }
}
