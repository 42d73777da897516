use crate::core::store::BlobStore;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory blob store using HashMap and RwLock. Contents are lost when
/// the store is dropped.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let blobs = self
            .inner
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        let value = blobs.get(key).cloned();
        if value.is_some() {
            debug!("Store HIT for key: {}", key);
        } else {
            debug!("Store MISS for key: {}", key);
        }
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut blobs = self
            .inner
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        debug!("Store PUT for key: {}", key);
        blobs.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_put() {
        let store = MemoryStore::new();

        // Initially, store is empty
        assert!(store.get("key1").unwrap().is_none());

        store.put("key1", b"one").unwrap();
        assert_eq!(store.get("key1").unwrap(), Some(b"one".to_vec()));

        // Last write wins
        store.put("key1", b"two").unwrap();
        assert_eq!(store.get("key1").unwrap(), Some(b"two".to_vec()));

        assert!(store.get("key2").unwrap().is_none());
    }
}
