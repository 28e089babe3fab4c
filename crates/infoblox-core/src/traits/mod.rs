//! Core traits for host record management
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`WapiTransport`]: Execute one HTTP exchange against the WAPI
//! - [`StateStore`]: Persist managed record state between runs

pub mod state_store;
pub mod transport;

pub use state_store::{ResourceState, StateStore};
pub use transport::{HttpMethod, TransportError, WapiRequest, WapiResponse, WapiTransport};
