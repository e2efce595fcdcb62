//! Key-value storage abstractions shared by the durable and session backends

use async_trait::async_trait;
use std::sync::Arc;

/// A named bag of byte values, addressed by byte keys.
///
/// Implementations swallow backend failures (logging them) so callers can
/// keep working from their in-memory state.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8]);
    async fn remove(&self, key: &[u8]);
}

/// Hands out collections by name.
pub trait Store: Send + Sync {
    /// Returns the collection called `name`. `persist` selects the durable
    /// backend; `None` means the collection does not exist and was not (or
    /// could not be) created.
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;
}
