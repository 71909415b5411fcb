use crate::domain_port::*;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Key/value slots persisted as a single JSON object on disk.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash never leaves a truncated file behind. The mutex serializes
/// read-modify-write cycles within this process.
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) if raw.is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => {
                serde_json::from_slice(&raw).map_err(|e| StorageError::Format(e.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    /// Like `load`, but a corrupt file is discarded; the flag reports whether
    /// that happened so the caller rewrites it.
    async fn load_or_discard(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.load().await {
            Ok(slots) => Ok((slots, false)),
            Err(StorageError::Format(e)) => {
                warn!(path = %self.path.display(), error = %e, "discarding corrupt session file");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, slots: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }

        let raw = serde_json::to_vec_pretty(slots).map_err(|e| StorageError::Format(e.to_string()))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        debug!(path = %self.path.display(), "session file written");
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let (mut slots, _) = self.load_or_discard().await?;
        slots.insert(key.to_string(), value.to_string());
        self.save(&slots).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let (mut slots, discarded) = self.load_or_discard().await?;
        if slots.remove(key).is_none() && !discarded {
            return Ok(());
        }
        self.save(&slots).await
    }
}
