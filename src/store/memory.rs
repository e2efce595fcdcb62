use crate::core::storage::KeyValueCollection;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection, lost when the process exits
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let map = self.inner.lock().await;
        let value = map.get(key).cloned();
        if value.is_some() {
            debug!("Memory HIT for key: {}", String::from_utf8_lossy(key));
        } else {
            debug!("Memory MISS for key: {}", String::from_utf8_lossy(key));
        }
        value
    }

    async fn put(&self, key: &[u8], value: &[u8]) {
        let mut map = self.inner.lock().await;
        debug!("Memory PUT for key: {}", String::from_utf8_lossy(key));
        map.insert(key.to_vec(), value.to_vec());
    }

    async fn remove(&self, key: &[u8]) {
        let mut map = self.inner.lock().await;
        map.remove(key);
        debug!("Memory REMOVE for key: {}", String::from_utf8_lossy(key));
    }
}
