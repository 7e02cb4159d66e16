use async_trait::async_trait;
use ns_core::{Error, KeyValueStore, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod backends;
pub mod history;

pub use backends::*;
pub use history::{move_to_front, HistoryStore, HISTORY_CAP, SEARCH_HISTORY_KEY};

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn new() -> Result<Self> where Self: Sized;
}

async fn open<T: StorageBackend + KeyValueStore + 'static>() -> Result<Arc<dyn KeyValueStore>> {
    match T::new().await {
        Ok(store) => Ok(Arc::new(store)),
        Err(e) => Err(Error::StorageRead(format!("{} ({})", T::get_error_message(), e))),
    }
}

/// Builds a key-value backend by name (`memory` or `file`).
pub async fn create_storage(kind: &str, path: Option<&Path>) -> Result<Arc<dyn KeyValueStore>> {
    let storage: Arc<dyn KeyValueStore> = match kind {
        "memory" => open::<MemoryStore>().await?,
        "file" => match path {
            Some(path) => Arc::new(FileStore::with_path(path)),
            None => open::<FileStore>().await?,
        },
        other => {
            return Err(Error::Config(format!(
                "Unknown storage backend: {} (expected memory or file)",
                other
            )))
        }
    };
    info!("🏦 Storage backend ready (using {})", kind);
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::history::HistoryStore;
    pub use super::create_storage;
}
