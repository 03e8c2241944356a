//! In-memory naming service for testing and ephemeral use.
//!
//! [`InMemoryNamingService`] keeps keys and bindings in `HashMap`s protected
//! by a `RwLock`. It implements the full [`NamingService`] trait and is
//! suitable for unit tests and short-lived processes.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use ipdns_crypto::PointerKey;
use ipdns_types::{ContentId, PointerId};
use tracing::debug;

use crate::error::{NamingError, Result};
use crate::names::validate_key_name;
use crate::traits::NamingService;

#[derive(Debug, Default)]
struct State {
    by_name: HashMap<String, PointerId>,
    by_key: HashMap<PointerId, String>,
    bindings: HashMap<PointerId, ContentId>,
}

/// An in-memory implementation of [`NamingService`].
///
/// Pointer identities are derived from freshly generated Ed25519 keys. Data
/// is lost when the service is dropped.
#[derive(Debug, Default)]
pub struct InMemoryNamingService {
    state: RwLock<State>,
}

impl InMemoryNamingService {
    /// Create a new empty naming service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an externally created pointer identity under `name`.
    ///
    /// Useful to reproduce a fixed trust root in tests. Fails if either the
    /// name or the key is already registered.
    pub fn import_key(&self, name: &str, key: PointerId) -> Result<()> {
        validate_key_name(name)?;
        let mut state = self.write_state();
        if state.by_name.contains_key(name) {
            return Err(NamingError::AlreadyExists {
                name: name.to_string(),
            });
        }
        if let Some(existing) = state.by_key.get(&key) {
            return Err(NamingError::AlreadyExists {
                name: existing.clone(),
            });
        }
        state.by_key.insert(key.clone(), name.to_string());
        state.by_name.insert(name.to_string(), key);
        Ok(())
    }

    /// Remove the binding of `key`, leaving the key itself in place.
    pub fn unpublish(&self, key: &PointerId) -> bool {
        self.write_state().bindings.remove(key).is_some()
    }

    /// Number of keys known to the service.
    pub fn key_count(&self) -> usize {
        self.read_state().by_name.len()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().expect("lock poisoned")
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().expect("lock poisoned")
    }
}

#[async_trait]
impl NamingService for InMemoryNamingService {
    async fn generate_key(&self, name: &str) -> Result<PointerId> {
        validate_key_name(name)?;
        let mut state = self.write_state();
        if state.by_name.contains_key(name) {
            return Err(NamingError::AlreadyExists {
                name: name.to_string(),
            });
        }
        let key = PointerKey::generate().pointer_id();
        state.by_key.insert(key.clone(), name.to_string());
        state.by_name.insert(name.to_string(), key.clone());
        debug!(name, key = %key.short(), "key generated");
        Ok(key)
    }

    async fn list_keys(&self) -> Result<Vec<(String, PointerId)>> {
        let state = self.read_state();
        let mut keys: Vec<(String, PointerId)> = state
            .by_name
            .iter()
            .map(|(name, key)| (name.clone(), key.clone()))
            .collect();
        keys.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(keys)
    }

    async fn publish(&self, key: &PointerId, cid: &ContentId) -> Result<()> {
        let mut state = self.write_state();
        if !state.by_key.contains_key(key) {
            return Err(NamingError::UnknownKey { key: key.clone() });
        }
        state.bindings.insert(key.clone(), cid.clone());
        debug!(key = %key.short(), cid = %cid.short(), "pointer published");
        Ok(())
    }

    async fn resolve(&self, key: &PointerId) -> Result<Option<ContentId>> {
        Ok(self.read_state().bindings.get(key).cloned())
    }

    async fn name_for_key(&self, key: &PointerId) -> Result<Option<String>> {
        Ok(self.read_state().by_key.get(key).cloned())
    }

    async fn key_for_name(&self, name: &str) -> Result<Option<PointerId>> {
        Ok(self.read_state().by_name.get(name).cloned())
    }
}
