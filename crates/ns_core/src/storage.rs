use async_trait::async_trait;
use crate::Result;

/// Durable string key-value slots.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, overwriting any prior one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key; deleting a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}
