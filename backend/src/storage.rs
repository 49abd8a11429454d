//! Key/value persistence port
//!
//! Screens never touch storage directly; they receive a [`KeyValueStore`]
//! and use `get`/`set`/`subscribe`. Values are plain strings.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, RwLock};

use crate::error::{AppError, AppResult};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// A key that was just written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChange {
    pub key: String,
    pub value: String,
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Receive every subsequent write
    fn subscribe(&self) -> broadcast::Receiver<KeyChange>;
}

/// Volatile store, used in tests and when no file is configured
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, String>>,
    changes: broadcast::Sender<KeyChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: RwLock::new(BTreeMap::new()),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        // No subscribers is fine
        let _ = self.changes.send(KeyChange {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<KeyChange> {
        self.changes.subscribe()
    }
}

/// Store persisted as one flat JSON object on disk
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
    changes: broadcast::Sender<KeyChange>,
}

impl JsonFileStore {
    /// Open the store, starting empty when the file does not exist yet
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AppError::Storage(format!("Corrupt store {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::info!(path = %path.display(), keys = values.len(), "Opened key/value store");
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            values: RwLock::new(values),
            changes,
        })
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let contents = serde_json::to_string_pretty(values)
            .map_err(|e| AppError::Storage(format!("Failed to encode store: {}", e)))?;

        // Write then rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to replace {}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values).await?;
        drop(values);

        let _ = self.changes.send(KeyChange {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<KeyChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("theme").await.unwrap(), None);
        store.set("theme", "dark").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_subscribe_sees_writes() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        store.set("alreadyLaunched", "true").await.unwrap();
        let change = rx.recv().await.unwrap();
        assert_eq!(change.key, "alreadyLaunched");
        assert_eq!(change.value, "true");
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("device.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.get("alreadyLaunched").await.unwrap(), None);
        store.set("alreadyLaunched", "true").await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("alreadyLaunched").await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(matches!(
            JsonFileStore::open(&path).await,
            Err(AppError::Storage(_))
        ));
    }
}
