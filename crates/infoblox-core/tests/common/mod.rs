//! Test doubles and common utilities for host record contract tests
//!
//! The scripted transport answers requests from a queue and records every
//! request it sees, so tests can assert on the exact wire traffic.

#![allow(dead_code)]

use infoblox_core::error::Result;
use infoblox_core::traits::{
    ResourceState, StateStore, TransportError, WapiRequest, WapiResponse, WapiTransport,
};
use infoblox_core::MemoryStateStore;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Reference the scripted server hands out for www.example.com
pub const WWW_REF: &str = "record:host/ZG5zLmhvc3QkLl9kZWZhdWx0LmNvbS5leGFtcGxlLnd3dw:www.example.com/default";

/// Reference the scripted server hands out for a replacement record
pub const WWW_REF_2: &str = "record:host/ZG5zLmhvc3QkLl9kZWZhdWx0LmNvbS5leGFtcGxlLnd3dzI:www.example.com/default";

pub type Scripted = std::result::Result<WapiResponse, TransportError>;

/// A WapiTransport that replays scripted responses in order
///
/// Running out of script is reported as a transport error so a test that
/// issues more requests than expected fails loudly.
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<WapiRequest>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a response
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(WapiResponse::new(status, body)));
        self
    }

    /// Queue a transport failure
    pub fn fail(self, message: &str) -> Self {
        self.push(Err(TransportError::new(message)));
        self
    }

    /// Queue a response on a transport already handed out
    pub fn push(&self, response: Scripted) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Number of execute() calls
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every request seen so far, in order
    pub fn requests(&self) -> Vec<WapiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `"METHOD path"` of every request seen so far
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    /// Scripted responses not consumed yet
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl WapiTransport for ScriptedTransport {
    async fn execute(
        &self,
        request: WapiRequest,
    ) -> std::result::Result<WapiResponse, TransportError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::new(format!(
                    "unscripted request: {} {}",
                    request.method, request.path
                )))
            })
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}

/// A StateStore that counts calls and delegates to a MemoryStateStore
pub struct CountingStateStore {
    inner: MemoryStateStore,
    set_call_count: Arc<AtomicUsize>,
    delete_call_count: Arc<AtomicUsize>,
    flush_call_count: Arc<AtomicUsize>,
}

impl CountingStateStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStateStore::new(),
            set_call_count: Arc::new(AtomicUsize::new(0)),
            delete_call_count: Arc::new(AtomicUsize::new(0)),
            flush_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_call_count(&self) -> usize {
        self.set_call_count.load(Ordering::SeqCst)
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }

    pub fn flush_call_count(&self) -> usize {
        self.flush_call_count.load(Ordering::SeqCst)
    }

    /// Create a CountingStateStore that shares state and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            inner: other.inner.clone(),
            set_call_count: Arc::clone(&other.set_call_count),
            delete_call_count: Arc::clone(&other.delete_call_count),
            flush_call_count: Arc::clone(&other.flush_call_count),
        }
    }
}

#[async_trait::async_trait]
impl StateStore for CountingStateStore {
    async fn get(&self, address: &str) -> Result<Option<ResourceState>> {
        self.inner.get(address).await
    }

    async fn set(&self, address: &str, state: &ResourceState) -> Result<()> {
        self.set_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.set(address, state).await
    }

    async fn delete(&self, address: &str) -> Result<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(address).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.inner.list().await
    }

    async fn flush(&self) -> Result<()> {
        self.flush_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.flush().await
    }
}

/// Body of a successful create: the reference as a JSON string
pub fn created_body(reference: &str) -> String {
    json!(reference).to_string()
}

/// Body of a successful read of a host record
pub fn host_record_body(reference: &str, fqdn: &str, ipv4: &str, ttl: u32) -> String {
    json!({
        "_ref": reference,
        "name": fqdn,
        "view": "default",
        "ttl": ttl,
        "use_ttl": true,
        "ipv4addrs": [{
            "_ref": format!("record:host_ipv4addr/ZG5z:{}/{}/default", ipv4, fqdn),
            "host": fqdn,
            "ipv4addr": ipv4,
            "configure_for_dhcp": false
        }]
    })
    .to_string()
}

/// Structured WAPI error body
pub fn wapi_error_body(error: &str, code: &str, text: &str) -> String {
    json!({"Error": error, "code": code, "text": text}).to_string()
}

/// Structured 404 body for a reference that no longer exists
pub fn not_found_body(reference: &str) -> String {
    wapi_error_body(
        &format!("AdmConDataNotFoundError: Reference {} not found", reference),
        "Client.Ibap.Data.NotFound",
        &format!("Reference {} not found", reference),
    )
}
