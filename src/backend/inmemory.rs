//! In-memory document backend (default, thread-safe, async).
//!
//! Uses DashMap for lock-free concurrent access with per-key sharding. The
//! conditional writes run under the shard lock of their key, which makes
//! them atomic per key. Contents live as long as the process.

use super::DocumentBackend;
use crate::error::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe async in-memory backend.
///
/// Clones share the same map.
///
/// # Example
///
/// ```no_run
/// use watch_store::backend::{DocumentBackend, InMemoryBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = InMemoryBackend::new();
///
///     assert!(backend.set_if_absent("watch:sku:A1", b"w-1".to_vec()).await?);
///     assert!(!backend.set_if_absent("watch:sku:A1", b"w-2".to_vec()).await?);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct InMemoryBackend {
    store: Arc<DashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Create a new in-memory backend.
    pub fn new() -> Self {
        InMemoryBackend {
            store: Arc::new(DashMap::new()),
        }
    }

    /// Get the current number of keys (documents plus index entries).
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.store.get(key).map(|entry| entry.value().clone());
        debug!(
            "✓ InMemory GET {} -> {}",
            key,
            if value.is_some() { "HIT" } else { "MISS" }
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.store.insert(key.to_string(), value);
        debug!("✓ InMemory SET {}", key);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        let stored = match self.store.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        };
        debug!("✓ InMemory SETNX {} -> {}", key, stored);
        Ok(stored)
    }

    async fn replace(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        let stored = match self.store.get_mut(key) {
            Some(mut entry) => {
                *entry.value_mut() = value;
                true
            }
            None => false,
        };
        debug!("✓ InMemory SETXX {} -> {}", key, stored);
        Ok(stored)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let existed = self.store.remove(key).is_some();
        debug!("✓ InMemory DELETE {} -> {}", key, existed);
        Ok(existed)
    }

    async fn take(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.store.remove(key).map(|(_, value)| value);
        debug!("✓ InMemory GETDEL {} -> {}", key, value.is_some());
        Ok(value)
    }

    async fn delete_if_eq(&self, key: &str, expected: &[u8]) -> Result<bool> {
        let removed = self
            .store
            .remove_if(key, |_, value| value.as_slice() == expected)
            .is_some();
        debug!("✓ InMemory DELETE-IF-EQ {} -> {}", key, removed);
        Ok(removed)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let keys: Vec<String> = self
            .store
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        debug!("✓ InMemory SCAN {}* -> {} keys", prefix, keys.len());
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains_key(key))
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<Vec<u8>>>> {
        let results = keys
            .iter()
            .map(|k| self.store.get(*k).map(|entry| entry.value().clone()))
            .collect();

        debug!("✓ InMemory MGET {} keys", keys.len());
        Ok(results)
    }

    async fn clear_all(&self) -> Result<()> {
        self.store.clear();
        warn!("⚠ InMemory CLEAR_ALL executed - all documents removed!");
        Ok(())
    }
}
