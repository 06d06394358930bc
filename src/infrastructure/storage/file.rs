use super::KeyValueStore;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Single JSON document on disk holding every key.
///
/// The file is read once on first access and rewritten on each mutation
/// through a sibling temp file followed by a rename, so a crash mid-write
/// leaves the previous document intact.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Option<Map<String, Value>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> ClientResult<Map<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Map::new()),
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(_) | Err(_) => {
                    tracing::warn!(path = %self.path.display(), "Storage file is not a JSON object, starting empty");
                    Ok(Map::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(ClientError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn persist(&self, entries: &Map<String, Value>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| ClientError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ClientError::Storage(format!("Failed to replace {}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> ClientResult<Option<Value>> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        Ok(guard.as_ref().and_then(|m| m.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: Value) -> ClientResult<()> {
        let mut guard = self.entries.lock().await;
        let mut entries = match guard.take() {
            Some(entries) => entries,
            None => self.load().await?,
        };
        entries.insert(key.to_string(), value);
        let result = self.persist(&entries).await;
        *guard = Some(entries);
        result
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        let mut guard = self.entries.lock().await;
        let mut entries = match guard.take() {
            Some(entries) => entries,
            None => self.load().await?,
        };
        let existed = entries.remove(key).is_some();
        let result = if existed { self.persist(&entries).await } else { Ok(()) };
        *guard = Some(entries);
        result
    }
}
