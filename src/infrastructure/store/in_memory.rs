//! In-memory key-value store

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::cache::{KeyValueStore, StoreStatus};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory store with per-key expiry.
///
/// Suitable for local development and as the test double for anything that
/// talks to the store seam. Always `Ready`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn pattern_matches(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn status(&self) -> StoreStatus {
        StoreStatus::Ready
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries
            .iter()
            .filter(|(key, value)| pattern_matches(pattern, key) && !value.is_expired())
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries
            .get(key)
            .filter(|value| !value.is_expired())
            .map(|value| value.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );

        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(keys
            .iter()
            .filter(|key| entries.remove(*key).is_some())
            .count())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();

        store.set("key1", "value1", None).await.unwrap();

        assert_eq!(
            store.get("key1").await.unwrap(),
            Some("value1".to_string())
        );
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new();

        store.set("key1", "old", None).await.unwrap();
        store.set("key1", "new", None).await.unwrap();

        assert_eq!(store.get("key1").await.unwrap(), Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_keys_prefix_pattern() {
        let store = MemoryStore::new();

        store.set("cache:question:a", "1", None).await.unwrap();
        store.set("cache:question:b", "2", None).await.unwrap();
        store.set("other:c", "3", None).await.unwrap();

        let mut keys = store.keys("cache:question:*").await.unwrap();
        keys.sort();

        assert_eq!(keys, vec!["cache:question:a", "cache:question:b"]);
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible() {
        let store = MemoryStore::new();

        store
            .set("gone", "x", Some(Duration::ZERO))
            .await
            .unwrap();
        store.set("kept", "y", None).await.unwrap();

        assert_eq!(store.get("gone").await.unwrap(), None);
        assert_eq!(store.keys("*").await.unwrap(), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_delete_batch() {
        let store = MemoryStore::new();

        store.set("a", "1", None).await.unwrap();
        store.set("b", "2", None).await.unwrap();

        let removed = store
            .delete(&["a".to_string(), "b".to_string(), "missing".to_string()])
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_always_ready() {
        let store = MemoryStore::new();

        assert_eq!(store.status(), StoreStatus::Ready);
        store.ping().await.unwrap();
    }
}
