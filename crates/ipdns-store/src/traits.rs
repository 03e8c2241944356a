use async_trait::async_trait;
use ipdns_types::ContentId;
use serde_json::Value;

use crate::error::StoreResult;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same value always produces the
///   same id.
/// - Writing an object that already exists is a no-op.
/// - Concurrent reads are always safe.
/// - The store never interprets object contents beyond JSON encoding.
/// - Backend failures are returned as errors, never reported as absence.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a JSON object and return its content id.
    async fn put(&self, object: &Value) -> StoreResult<ContentId>;

    /// Read an object by content id.
    ///
    /// Returns `Ok(None)` if the object is unknown to the store.
    /// Returns `Err` on communication failure or data corruption.
    async fn get(&self, id: &ContentId) -> StoreResult<Option<Value>>;

    /// Check whether an object exists in the store.
    async fn exists(&self, id: &ContentId) -> StoreResult<bool> {
        Ok(self.get(id).await?.is_some())
    }
}
