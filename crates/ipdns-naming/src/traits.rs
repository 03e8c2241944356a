//! The [`NamingService`] trait defining the mutable pointer interface.
//!
//! Any backend (in-memory, an IPNS node) implements this trait to bind
//! human-readable key names to pointer identities and pointer identities to
//! content ids.

use async_trait::async_trait;
use ipdns_types::{ContentId, PointerId};

use crate::error::{NamingError, Result};

/// Mutable pointer layer over the content-addressed store.
///
/// Implementations must be thread-safe (`Send + Sync`). Each key name maps
/// to exactly one pointer identity. Pointer bindings are the only mutable
/// state in the system; resolvers only ever call [`resolve`](Self::resolve).
#[async_trait]
pub trait NamingService: Send + Sync {
    /// Create a new key under `name` and return its pointer identity.
    ///
    /// Fails with [`NamingError::AlreadyExists`] if the name is taken.
    async fn generate_key(&self, name: &str) -> Result<PointerId>;

    /// All known keys as `(name, pointer)` pairs, sorted by name.
    async fn list_keys(&self) -> Result<Vec<(String, PointerId)>>;

    /// Bind `key` to `cid`, replacing any previous binding.
    ///
    /// Publishing the same content id twice leaves the binding unchanged.
    async fn publish(&self, key: &PointerId, cid: &ContentId) -> Result<()>;

    /// The content id currently bound to `key`.
    ///
    /// Returns `Ok(None)` when nothing has been published under the key.
    async fn resolve(&self, key: &PointerId) -> Result<Option<ContentId>>;

    /// The key name bound to a pointer identity, if known.
    async fn name_for_key(&self, key: &PointerId) -> Result<Option<String>> {
        Ok(self
            .list_keys()
            .await?
            .into_iter()
            .find(|(_, k)| k == key)
            .map(|(name, _)| name))
    }

    /// The pointer identity bound to a key name, if known.
    async fn key_for_name(&self, name: &str) -> Result<Option<PointerId>> {
        Ok(self
            .list_keys()
            .await?
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, key)| key))
    }

    /// Publish `cid` under the key named `name`.
    async fn publish_to_name(&self, name: &str, cid: &ContentId) -> Result<()> {
        let key = self
            .key_for_name(name)
            .await?
            .ok_or_else(|| NamingError::UnknownName {
                name: name.to_string(),
            })?;
        self.publish(&key, cid).await
    }

    /// Return the key named `name`, generating it first if it does not exist.
    async fn ensure_key(&self, name: &str) -> Result<PointerId> {
        match self.key_for_name(name).await? {
            Some(key) => Ok(key),
            None => self.generate_key(name).await,
        }
    }
}
