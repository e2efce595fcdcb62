pub mod disk;
pub mod memory;

use crate::core::storage::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::{debug, warn};

/// A thread-safe key-value store that can hold multiple collections.
///
/// Durable collections live in a fjall keyspace; ephemeral ones in memory.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// Opens (or creates) the durable keyspace under `data_path/storage`.
    /// If the keyspace cannot be opened only ephemeral collections are
    /// available.
    pub fn open(data_path: &Path) -> Self {
        let storage_dir = data_path.join("storage");
        let keyspace = match fjall::Config::new(&storage_dir).open() {
            Ok(keyspace) => {
                debug!("Opened keyspace at {}", storage_dir.display());
                Some(Arc::new(keyspace))
            }
            Err(e) => {
                warn!(
                    "Failed to open keyspace at {}: {}. Durable storage disabled",
                    storage_dir.display(),
                    e
                );
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    /// A store with no durable backend at all.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_durable(&self) -> bool {
        self.keyspace.is_some()
    }

    fn create_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>> {
        if !persist {
            return Some(Arc::new(MemoryCollection::new()));
        }
        let keyspace = self.keyspace.as_ref()?;
        match keyspace.open_partition(name, PartitionCreateOptions::default()) {
            Ok(partition) => Some(Arc::new(DiskCollection::new(
                Arc::clone(keyspace),
                partition,
            ))),
            Err(e) => {
                warn!("Failed to open partition {}: {}", name, e);
                None
            }
        }
    }
}

impl Store for KeyValueStore {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(collection) = collections.get(name) {
            return Some(Arc::clone(collection));
        }
        if !create_if_missing {
            return None;
        }

        // Failed to create persistent collection
        let collection = self.create_collection(name, persist)?;
        collections.insert(name.to_string(), Arc::clone(&collection));
        Some(collection)
    }
}
