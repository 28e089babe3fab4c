// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Crash Behavior
//
// All state is lost when the process exits. A later run no longer knows the
// reference of any record it created, so `apply` would create a duplicate.
// Use it for tests and for one-shot runs that end in `destroy`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{ResourceState, StateStore};

/// In-memory state store implementation
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<String, ResourceState>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked resources
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, address: &str) -> Result<Option<ResourceState>, Error> {
        Ok(self.inner.read().await.get(address).cloned())
    }

    async fn set(&self, address: &str, state: &ResourceState) -> Result<(), Error> {
        self.inner
            .write()
            .await
            .insert(address.to_string(), state.clone());
        Ok(())
    }

    async fn delete(&self, address: &str) -> Result<(), Error> {
        self.inner.write().await.remove(address);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let mut addresses: Vec<String> = self.inner.read().await.keys().cloned().collect();
        addresses.sort();
        Ok(addresses)
    }

    async fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}
