// # infoblox-core
//
// Core library for managing Infoblox DNS host records over the WAPI REST
// interface.
//
// ## Architecture Overview
//
// - **WapiTransport**: Trait for executing one HTTP exchange against the WAPI
// - **HostRecordResource**: Create/read/update/delete of a single host record,
//   with every response classified before it is trusted
// - **StateStore**: Trait for persisting the reference of each managed record
// - **LifecycleEngine**: Plans and applies declarations against stored state
// - **ProviderConfig**: Connection settings and the WAPI version gate
//
// ## Design Principles
//
// 1. **Injected transport**: no global client; configuration is an immutable
//    value and the transport is passed in
// 2. **Typed wire schemas**: one request/response type per endpoint
// 3. **No retries**: every failure is surfaced to the caller
// 4. **Library-First**: the binary is a thin layer over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod host_record;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{ClientConfig, ProviderConfig, WapiVersion};
pub use engine::{ApplyOutcome, LifecycleEngine, Plan};
pub use error::{Error, Operation, Result};
pub use host_record::{DesiredRecord, HostRecordResource, HostRecordState, ResourceId};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{StateStore, WapiTransport};
