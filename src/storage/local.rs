//! Local key/value store
//!
//! A namespaced JSON object persisted to `<dir>/<namespace>.json`, used for
//! small client-side state such as saved CSV column mappings and the offline
//! action queue.
//!
//! Failures never reach the caller: reads fall back to the supplied default
//! and writes report `false`, with a warning logged in both cases.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// JSON-file-backed key/value store
pub struct LocalStore {
    path: PathBuf,
    namespace: String,
    // serializes read-modify-write cycles on the backing file
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(dir: impl AsRef<Path>, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            path: dir.as_ref().join(format!("{}.json", namespace)),
            namespace,
            write_lock: Mutex::new(()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, String> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| e.to_string())?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content).map_err(|e| e.to_string())
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = serde_json::to_string_pretty(map).map_err(|e| e.to_string())?;
        // write-then-rename
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| e.to_string())?;
        std::fs::rename(&tmp, &self.path).map_err(|e| e.to_string())
    }

    /// Read `key`, returning `default` when absent or unreadable
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, key, error = %e, "Local store read failed");
                return default;
            }
        };
        match map.get(key) {
            None => default,
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(namespace = %self.namespace, key, error = %e, "Local store value could not be decoded");
                    default
                }
            },
        }
    }

    /// Read `key`, falling back to `T::default()`
    pub fn get<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get_or(key, T::default())
    }

    /// Store `value` under `key`. Returns `false` when the write failed.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let result = serde_json::to_value(value)
            .map_err(|e| e.to_string())
            .and_then(|value| {
                // a missing file reads as empty; any other read error aborts
                let mut map = self.read_map()?;
                map.insert(key.to_string(), value);
                self.write_map(&map)
            });
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, key, error = %e, "Local store write failed");
                false
            }
        }
    }

    /// Remove `key`. Returns `false` when the write failed.
    pub fn remove(&self, key: &str) -> bool {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, key, error = %e, "Local store read failed");
                return false;
            }
        };
        if map.remove(key).is_none() {
            return true;
        }
        match self.write_map(&map) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, key, error = %e, "Local store write failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_set_and_get() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "app");
        assert!(store.set("count", &3u32));
        assert_eq!(store.get_or("count", 0u32), 3);
        assert_eq!(store.get::<Vec<String>>("missing"), Vec::<String>::new());
    }

    #[test]
    fn test_values_survive_new_instance() {
        let dir = tempdir().unwrap();
        {
            let store = LocalStore::new(dir.path(), "app");
            let mut map = HashMap::new();
            map.insert("a".to_string(), 1);
            assert!(store.set("map", &map));
        }
        let store = LocalStore::new(dir.path(), "app");
        let map: HashMap<String, i32> = store.get("map");
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "app");
        std::fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.get_or("key", 42), 42);
    }

    #[test]
    fn test_set_keeps_unreadable_file_intact() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "app");
        std::fs::write(store.path(), "{\"queue\": [1, 2").unwrap();

        assert!(!store.set("csv_mappings", &1));
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "{\"queue\": [1, 2");
        assert!(!store.remove("queue"));
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "app");
        assert!(store.set("key", "text"));
        assert_eq!(store.get_or("key", 7u8), 7);
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "app");
        store.set("key", &true);
        assert!(store.remove("key"));
        assert!(!store.get_or("key", false));
        assert!(store.remove("never-set"));
    }

    #[test]
    fn test_write_failure_reports_false() {
        let dir = tempdir().unwrap();
        // a file where the directory should be makes create_dir_all fail
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "x").unwrap();
        let store = LocalStore::new(blocker.join("nested"), "app");
        assert!(!store.set("key", &1));
    }
}
