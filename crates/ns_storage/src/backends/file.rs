use async_trait::async_trait;
use ns_core::{Error, KeyValueStore, Result};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use crate::StorageBackend;

const FILE_NAME: &str = "storage.json";

type Values = BTreeMap<String, String>;

/// Keeps every key in a single JSON object file.
///
/// Writes are serialized through a lock and land atomically via a sibling
/// temp file, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

/// `$XDG_DATA_HOME/ns/storage.json`, then `$HOME/.local/share/ns/storage.json`,
/// then `./ns-storage.json`.
pub fn default_path() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_DATA_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join("ns").join(FILE_NAME);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("ns")
            .join(FILE_NAME);
    }
    PathBuf::from("ns-storage.json")
}

impl FileStore {
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents for a rewrite. An unreadable file is replaced rather
    /// than blocking every future write.
    async fn values_for_write(&self) -> Values {
        match self.read_values().await {
            Ok(values) => values,
            Err(e) => {
                warn!("⚠️ Replacing unreadable storage file: {}", e);
                Values::new()
            }
        }
    }

    async fn read_values(&self) -> Result<Values> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Values::new()),
            Err(e) => {
                return Err(Error::StorageRead(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(Values::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            Error::StorageRead(format!("Corrupt storage file {}: {}", self.path.display(), e))
        })
    }

    async fn write_values(&self, values: &Values) -> Result<()> {
        let write_err = |e: std::io::Error| {
            Error::StorageWrite(format!("Failed to write {}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let body = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        debug!("Wrote {} keys to {}", values.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileStore {
    fn get_error_message() -> &'static str {
        "Storage file directory should be writable"
    }

    async fn new() -> Result<Self> where Self: Sized {
        Ok(Self::with_path(default_path()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.read_values().await?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.values_for_write().await;
        values.insert(key.to_string(), value.to_string());
        self.write_values(&values).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.values_for_write().await;
        if values.remove(key).is_some() {
            self.write_values(&values).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::with_path(dir.path().join("nothing.json"));
        assert_eq!(store.get("SearchHistory").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::with_path(&path);
        store.set("SearchHistory", "[\"cats\",\"dogs\"]").await.unwrap();
        store.set("other", "1").await.unwrap();

        let reopened = FileStore::with_path(&path);
        assert_eq!(
            reopened.get("SearchHistory").await.unwrap().as_deref(),
            Some("[\"cats\",\"dogs\"]")
        );
        assert_eq!(reopened.get("other").await.unwrap().as_deref(), Some("1"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempdir().unwrap();
        let store = FileStore::with_path(dir.path().join("storage.json"));
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.remove("a").await.unwrap();
        store.remove("missing").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::with_path(&path);
        let err = store.get("SearchHistory").await.unwrap_err();
        assert!(matches!(err, Error::StorageRead(_)));

        store.set("SearchHistory", "[]").await.unwrap();
        assert_eq!(store.get("SearchHistory").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_corrupt_file_drops_old_keys_on_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{\"other\": ").unwrap();

        let store = FileStore::with_path(&path);
        store.remove("other").await.unwrap();
        store.set("SearchHistory", "[\"cats\"]").await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let values: Values = serde_json::from_str(&raw).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("SearchHistory").map(String::as_str), Some("[\"cats\"]"));
    }

    #[tokio::test]
    async fn test_unwritable_location() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let store = FileStore::with_path(blocker.join("storage.json"));
        let err = store.set("k", "v").await.unwrap_err();
        assert!(matches!(err, Error::StorageWrite(_)));
    }
}
