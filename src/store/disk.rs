use crate::core::storage::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::{debug, warn};

/// Durable collection backed by a fjall partition. Every write is synced to
/// the journal before returning.
pub struct DiskCollection {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn sync(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.partition.get(key) {
            Ok(Some(value)) => {
                debug!("Disk HIT for key: {}", String::from_utf8_lossy(key));
                Some(value.to_vec())
            }
            Ok(None) => {
                debug!("Disk MISS for key: {}", String::from_utf8_lossy(key));
                None
            }
            Err(e) => {
                warn!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &[u8], value: &[u8]) {
        let res: Result<()> = (|| {
            self.partition.insert(key, value)?;
            self.sync()
        })();
        match res {
            Ok(()) => debug!("Disk PUT for key: {}", String::from_utf8_lossy(key)),
            Err(e) => warn!("DiskCollection put error: {}", e),
        }
    }

    async fn remove(&self, key: &[u8]) {
        let res: Result<()> = (|| {
            self.partition.remove(key)?;
            self.sync()
        })();
        match res {
            Ok(()) => debug!("Disk REMOVE for key: {}", String::from_utf8_lossy(key)),
            Err(e) => warn!("DiskCollection remove error: {}", e),
        }
    }
}
