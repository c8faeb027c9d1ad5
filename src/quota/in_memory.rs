//! Process-local counter store with per-key expiry
//!
//! Counts live only as long as the process; every instance keeps its own.
//! Expired entries read as absent and are swept on the next write.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CounterError, CounterStore};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory counter store
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CounterError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CounterError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let store = InMemoryCounterStore::new();
        assert_eq!(store.get("rate:x:2024-01-01").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites_value() {
        let store = InMemoryCounterStore::new();
        store.put("k", "1", Duration::from_secs(60)).await.unwrap();
        store.put("k", "2", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = InMemoryCounterStore::new();
        store.put("k", "5", Duration::from_millis(20)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("5"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_swept_on_write() {
        let store = InMemoryCounterStore::new();
        store.put("old", "1", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        store.put("new", "1", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.entries.read().await.len(), 1);
        assert_eq!(store.len().await, 1);
    }
}
