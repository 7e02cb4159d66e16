use ns_core::{KeyValueStore, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Storage slot holding the JSON-encoded list of recent searches.
pub const SEARCH_HISTORY_KEY: &str = "SearchHistory";

/// Number of recent searches kept.
pub const HISTORY_CAP: usize = 3;

/// Puts `query` first, drops any other copy of it and keeps at most `cap` entries.
pub fn move_to_front(current: &[String], query: &str, cap: usize) -> Vec<String> {
    std::iter::once(query.to_string())
        .chain(current.iter().filter(|item| item.as_str() != query).cloned())
        .take(cap)
        .collect()
}

fn normalize(entries: Vec<String>, cap: usize) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(cap);
    for entry in entries {
        if result.len() == cap {
            break;
        }
        if !entry.is_empty() && !result.contains(&entry) {
            result.push(entry);
        }
    }
    result
}

/// Most-recent-first list of distinct queries, mirrored to a key-value store.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    entries: RwLock<Vec<String>>,
    cap: usize,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_cap(store, HISTORY_CAP)
    }

    pub fn with_cap(store: Arc<dyn KeyValueStore>, cap: usize) -> Self {
        Self {
            store,
            entries: RwLock::new(Vec::new()),
            cap,
        }
    }

    /// Replaces the in-memory list with the persisted one.
    ///
    /// Never fails: a missing, unreadable or malformed slot yields an empty list.
    pub async fn load(&self) -> Vec<String> {
        let loaded = match self.store.get(SEARCH_HISTORY_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(entries) => normalize(entries, self.cap),
                Err(e) => {
                    warn!("⚠️ Ignoring malformed search history: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("⚠️ Failed to load search history: {}", e);
                Vec::new()
            }
        };
        debug!("Loaded {} recent searches", loaded.len());
        *self.entries.write().await = loaded.clone();
        loaded
    }

    /// Snapshot of the current list.
    pub async fn entries(&self) -> Vec<String> {
        self.entries.read().await.clone()
    }

    /// Moves the trimmed `query` to the front and persists the result.
    ///
    /// Blank queries leave the list untouched. A failed write is logged and the
    /// in-memory list keeps the update.
    pub async fn record(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return self.entries().await;
        }

        let updated = {
            let mut entries = self.entries.write().await;
            *entries = move_to_front(&entries, query, self.cap);
            entries.clone()
        };

        if let Err(e) = self.persist(&updated).await {
            error!("❌ Failed to save search history: {}", e);
        }
        updated
    }

    /// Empties the list in memory and in storage.
    pub async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        self.persist(&[]).await?;
        info!("🧹 Search history cleared");
        Ok(())
    }

    async fn persist(&self, entries: &[String]) -> Result<()> {
        let encoded = serde_json::to_string(entries)?;
        self.store.set(SEARCH_HISTORY_KEY, &encoded).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_move_to_front() {
        let current = list(&["birds", "dogs", "cats"]);
        assert_eq!(move_to_front(&current, "fish", 3), list(&["fish", "birds", "dogs"]));
        assert_eq!(move_to_front(&current, "dogs", 3), list(&["dogs", "birds", "cats"]));
        assert_eq!(move_to_front(&current, "birds", 3), current);
        assert_eq!(move_to_front(&[], "cats", 3), list(&["cats"]));
    }

    #[test]
    fn test_move_to_front_is_case_sensitive() {
        let current = list(&["Cats"]);
        assert_eq!(move_to_front(&current, "cats", 3), list(&["cats", "Cats"]));
    }

    #[test]
    fn test_law_over_sequence() {
        let values = ["a", "b", "a", "c", "d", "c", "e", "b", "b"];
        let mut history = Vec::new();
        for (i, value) in values.iter().enumerate() {
            history = move_to_front(&history, value, HISTORY_CAP);

            let mut distinct_recent: Vec<&str> = Vec::new();
            for v in values[..=i].iter().rev() {
                if !distinct_recent.contains(v) {
                    distinct_recent.push(v);
                }
            }
            distinct_recent.truncate(HISTORY_CAP);

            assert_eq!(history, distinct_recent, "after {} records", i + 1);
            assert_eq!(history[0], *value);
        }
    }

    #[test]
    fn test_normalize() {
        let raw = list(&["a", "", "a", "b", "c", "d"]);
        assert_eq!(normalize(raw, 3), list(&["a", "b", "c"]));
    }
}
