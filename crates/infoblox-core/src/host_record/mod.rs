//! Infoblox host records
//!
//! - [`types`]: declared record, local state and per-endpoint wire schemas
//! - [`mapper`]: declared fields to request bodies and back
//! - [`identity`]: reference extraction from create responses
//! - [`classify`]: response classification
//! - [`resource`]: the CRUD operations themselves

pub mod classify;
pub mod identity;
pub mod mapper;
pub mod resource;
pub mod types;

pub use classify::{Outcome, check, classify_status};
pub use identity::extract_ref;
pub use mapper::{from_remote, join_fqdn, split_fqdn, to_create_body, to_update_body};
pub use resource::HostRecordResource;
pub use types::{
    DEFAULT_TTL, DesiredRecord, HostRecordCreate, HostRecordState, HostRecordUpdate,
    Ipv4AddrSpec, RemoteHostRecord, RemoteIpv4Addr, ResourceId, WapiError,
};
