// # State Store Trait
//
// Defines the interface for persisting managed host record state.
//
// ## Purpose
//
// The WAPI only hands out a record's reference once, in the create response.
// The state store keeps that reference (and the fields last read back from
// the server) per resource address so later runs can read, update and delete
// the same record.
//
// ## Implementations
//
// - In-memory: `MemoryStateStore`
// - File-based: `FileStateStore` (JSON, atomic writes, backup recovery)

use async_trait::async_trait;

use crate::host_record::HostRecordState;

/// Persisted state of one managed host record
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceState {
    /// Reference and fields from the last successful read
    pub record: HostRecordState,
    /// When the record was last read back from the server
    pub last_refreshed: chrono::DateTime<chrono::Utc>,
}

impl ResourceState {
    /// Wrap freshly read record state
    pub fn new(record: HostRecordState) -> Self {
        Self {
            record,
            last_refreshed: chrono::Utc::now(),
        }
    }
}

/// Trait for state store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// ## Implementation Guidelines
///
/// - **Async I/O only**: Use async file/database operations, never blocking I/O
/// - **Explicit flush**: `flush()` must persist all pending changes
/// - **No business logic**: deciding what to create, update or delete is
///   owned by `LifecycleEngine`
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the state stored under `address`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ResourceState))`: The stored state
    /// - `Ok(None)`: Nothing tracked under this address
    /// - `Err(Error)`: Storage error
    async fn get(&self, address: &str) -> Result<Option<ResourceState>, crate::Error>;

    /// Create or replace the state stored under `address`
    async fn set(&self, address: &str, state: &ResourceState) -> Result<(), crate::Error>;

    /// Forget `address` (succeeds if it was not tracked)
    async fn delete(&self, address: &str) -> Result<(), crate::Error>;

    /// List all tracked addresses
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
