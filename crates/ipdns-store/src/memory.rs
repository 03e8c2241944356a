use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use ipdns_crypto::ContentHasher;
use ipdns_types::ContentId;
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Objects are kept in their serialized
/// form behind a `RwLock` and re-verified against their id on every read.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total serialized bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|data| data.len() as u64)
            .sum()
    }

    /// Remove an object. Returns `true` if it existed.
    ///
    /// Only meant for simulating unavailable content; nothing in the serving
    /// path deletes objects.
    pub fn remove(&self, id: &ContentId) -> bool {
        self.objects
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some()
    }

    /// Return a sorted list of all content ids in the store.
    pub fn all_ids(&self) -> Vec<ContentId> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ContentId> = map.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, object: &Value) -> StoreResult<ContentId> {
        let data =
            serde_json::to_vec(object).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let id = ContentHasher::OBJECT.hash(&data);
        let mut map = self.objects.write().expect("lock poisoned");
        // Same id always means same content, so an existing entry is kept.
        map.entry(id.clone()).or_insert(data);
        debug!(cid = %id.short(), "object stored");
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> StoreResult<Option<Value>> {
        let data = {
            let map = self.objects.read().expect("lock poisoned");
            match map.get(id) {
                Some(data) => data.clone(),
                None => return Ok(None),
            }
        };
        let computed = ContentHasher::OBJECT.hash(&data);
        if computed != *id {
            return Err(StoreError::HashMismatch {
                id: id.clone(),
                computed,
            });
        }
        let value = serde_json::from_slice(&data).map_err(|e| StoreError::CorruptObject {
            id: id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(value))
    }

    async fn exists(&self, id: &ContentId) -> StoreResult<bool> {
        Ok(self.objects.read().expect("lock poisoned").contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
