use anyhow::{Context, Result};
use std::{collections::BTreeMap, fs, path::PathBuf, sync::RwLock};

use super::KeyValueStore;

/// Key-value pairs kept in a single pretty-printed JSON object file.
///
/// The whole map is rewritten on every `set`; the file only ever holds a
/// handful of keys.
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn persist(&self, data: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write store to {}", self.path.display()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(key.to_string(), value.to_string());
        self.persist(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::new(path.clone()).unwrap();
        store.set("steps", "42").unwrap();
        store.set("sensitivity", "10.5").unwrap();
        drop(store);

        let reopened = JsonFileStore::new(path).unwrap();
        assert_eq!(reopened.get("steps").unwrap().as_deref(), Some("42"));
        assert_eq!(reopened.get("sensitivity").unwrap().as_deref(), Some("10.5"));
        assert_eq!(reopened.get("missing").unwrap(), None);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(path).unwrap();
        assert_eq!(store.get("steps").unwrap(), None);
        store.set("steps", "1").unwrap();
        assert_eq!(store.get("steps").unwrap().as_deref(), Some("1"));
    }
}
