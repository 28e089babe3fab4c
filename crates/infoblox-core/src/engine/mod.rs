//! Host record lifecycle engine
//!
//! The LifecycleEngine is responsible for:
//! - Remembering which remote record backs each resource address
//! - Deciding whether a declaration needs a create, update or replace
//! - Persisting the state read back after every successful change
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────┐
//!  DesiredRecord ─▶│ LifecycleEngine  │
//!                  └──────────────────┘
//!                     │            │
//!                     ▼            ▼
//!          ┌────────────────────┐ ┌─────────────┐
//!          │ HostRecordResource │ │ StateStore  │
//!          │ (WAPI calls)       │ │ (reference) │
//!          └────────────────────┘ └─────────────┘
//! ```
//!
//! ## Apply Flow
//!
//! 1. Refresh: read the tracked record (if any) and store what came back
//! 2. Plan against the refreshed state
//! 3. Execute the plan through HostRecordResource
//! 4. On success, store the new state
//!
//! Name, domain and TTL cannot be changed in place; a change to any of them
//! deletes the record and creates a new one. Nothing is retried and a failed
//! step leaves the stored state as the last successful step wrote it.

use std::fmt;

use tracing::{debug, info};

use crate::error::Result;
use crate::host_record::{DesiredRecord, HostRecordResource, HostRecordState};
use crate::traits::{ResourceState, StateStore};

/// What `apply` would do for a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Nothing tracked: create a new record
    Create,
    /// Only the address changed: update in place
    Update,
    /// An immutable field changed: delete, then create
    Replace,
    /// Tracked record already matches
    NoChange,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Plan::Create => "create",
            Plan::Update => "update",
            Plan::Replace => "replace",
            Plan::NoChange => "no change",
        })
    }
}

/// What `apply` did, with the state read back afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created(HostRecordState),
    Updated(HostRecordState),
    Replaced(HostRecordState),
    Unchanged(HostRecordState),
}

impl ApplyOutcome {
    /// The record as it now exists on the server
    pub fn state(&self) -> &HostRecordState {
        match self {
            ApplyOutcome::Created(state)
            | ApplyOutcome::Updated(state)
            | ApplyOutcome::Replaced(state)
            | ApplyOutcome::Unchanged(state) => state,
        }
    }
}

/// Decide what to do given the tracked state and the declaration
pub fn decide(current: Option<&HostRecordState>, desired: &DesiredRecord) -> Plan {
    let Some(current) = current else {
        return Plan::Create;
    };

    if current.fqdn != desired.fqdn() || current.ttl != desired.ttl {
        Plan::Replace
    } else if current.ipv4 != desired.ipv4 {
        Plan::Update
    } else {
        Plan::NoChange
    }
}

/// Lifecycle engine for Infoblox host records
///
/// One call at a time; the engine never runs operations concurrently.
pub struct LifecycleEngine {
    resource: HostRecordResource,
    state_store: Box<dyn StateStore>,
}

impl LifecycleEngine {
    /// Create a new engine
    pub fn new(resource: HostRecordResource, state_store: Box<dyn StateStore>) -> Self {
        Self {
            resource,
            state_store,
        }
    }

    /// Plan against the stored state, without calling the server
    pub async fn plan(&self, address: &str, desired: &DesiredRecord) -> Result<Plan> {
        desired.validate()?;
        let stored = self.state_store.get(address).await?;
        Ok(decide(stored.as_ref().map(|s| &s.record), desired))
    }

    /// Read the tracked record back from the server and store the result
    ///
    /// Returns `None` when nothing is tracked under `address`. Read errors,
    /// including a 404 for a record deleted elsewhere, are returned as is.
    pub async fn refresh(&self, address: &str) -> Result<Option<HostRecordState>> {
        let Some(stored) = self.state_store.get(address).await? else {
            debug!("{}: nothing tracked, skipping refresh", address);
            return Ok(None);
        };

        let state = self.resource.read(&stored.record.id).await?;
        if state != stored.record {
            info!("{}: remote record drifted from stored state", address);
        }
        self.persist(address, &state).await?;

        Ok(Some(state))
    }

    /// Converge the record tracked under `address` on `desired`
    pub async fn apply(&self, address: &str, desired: &DesiredRecord) -> Result<ApplyOutcome> {
        desired.validate()?;

        let current = self.refresh(address).await?;
        let plan = decide(current.as_ref(), desired);
        info!("{}: plan is {}", address, plan);

        let outcome = match (plan, current) {
            (Plan::NoChange, Some(current)) => ApplyOutcome::Unchanged(current),
            (Plan::Update, Some(current)) => {
                let state = self.resource.update(&current.id, desired).await?;
                self.persist(address, &state).await?;
                ApplyOutcome::Updated(state)
            }
            (Plan::Replace, Some(current)) => {
                self.resource.delete(&current.id).await?;
                self.state_store.delete(address).await?;
                let state = self.resource.create(desired).await?;
                self.persist(address, &state).await?;
                ApplyOutcome::Replaced(state)
            }
            _ => {
                let state = self.resource.create(desired).await?;
                self.persist(address, &state).await?;
                ApplyOutcome::Created(state)
            }
        };

        self.state_store.flush().await?;
        Ok(outcome)
    }

    /// Delete the record tracked under `address` and forget it
    ///
    /// Returns `false` if nothing was tracked.
    pub async fn destroy(&self, address: &str) -> Result<bool> {
        let Some(stored) = self.state_store.get(address).await? else {
            debug!("{}: nothing tracked, nothing to destroy", address);
            return Ok(false);
        };

        self.resource.delete(&stored.record.id).await?;
        self.state_store.delete(address).await?;
        self.state_store.flush().await?;
        info!("{}: destroyed {}", address, stored.record.id);

        Ok(true)
    }

    /// Addresses currently tracked
    pub async fn tracked(&self) -> Result<Vec<String>> {
        self.state_store.list().await
    }

    async fn persist(&self, address: &str, state: &HostRecordState) -> Result<()> {
        self.state_store
            .set(address, &ResourceState::new(state.clone()))
            .await
    }
}
