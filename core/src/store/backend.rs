// Storage abstraction for the trusted-token slot

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Durable string key-value storage.
///
/// The browser adapter wraps `localStorage`; tests and storage-less
/// environments use [`MemoryStorage`]. No `Send`/`Sync` bound: the gate runs
/// on the page's single event loop and browser handles are not thread-safe.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, String>;
    fn put(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
}

/// In-memory storage useful for testing and for pages with storage disabled
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a single entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.data.write().insert(key.to_string(), value.to_string());
        storage
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), String> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.data.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        storage.put("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_clones_share_data() {
        let storage = MemoryStorage::with_entry("k", "v");
        let view = storage.clone();
        storage.put("k2", "v2").unwrap();
        assert_eq!(view.len(), 2);
    }
}
