//! Key-value settings stores.

use crate::{ConfigError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Asynchronous key-value store holding JSON documents.
///
/// A missing key is `Ok(None)`; errors are reserved for storage that exists
/// but cannot be read.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the document stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete the document stored under `key`, if any.
    async fn remove(&self, key: &str) -> Result<()>;

    /// List stored keys.
    async fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one document
    pub fn with_entry(key: impl Into<String>, value: Value) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value);
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Store keeping one `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `data_dir`. The directory is created lazily on
    /// first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Store under the platform configuration directory (`<config>/mailsmith`).
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(Self::new(dir.join("mailsmith")))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && !key.contains('\0');
        if !valid {
            return Err(ConfigError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key, path = %path.display(), "Settings key not stored");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        // An empty file is treated like a missing one.
        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let json = serde_json::to_string_pretty(&value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(key, path = %path.display(), "Settings key written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("settings").await.unwrap(), None);

        store.set("settings", json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("settings").await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.keys().await.unwrap(), vec!["settings".to_string()]);

        store.remove("settings").await.unwrap();
        assert_eq!(store.get("settings").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("not-created-yet"));

        assert_eq!(store.get("settings").await.unwrap(), None);
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));

        store
            .set("settings", json!({"mjml": {"useMjmlConfig": true}}))
            .await
            .unwrap();

        assert!(dir.path().join("data/settings.json").exists());
        let value = store.get("settings").await.unwrap().unwrap();
        assert_eq!(value["mjml"]["useMjmlConfig"], json!(true));
        assert_eq!(store.keys().await.unwrap(), vec!["settings".to_string()]);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{broken").unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(matches!(
            store.get("settings").await,
            Err(ConfigError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_keys() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(matches!(
            store.get("../escape").await,
            Err(ConfigError::InvalidKey(_))
        ));
        assert!(matches!(store.set("", json!(1)).await, Err(ConfigError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_file_store_remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.remove("settings").await.unwrap();
    }
}
