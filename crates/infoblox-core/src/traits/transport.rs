// # WAPI Transport Trait
//
// Defines the seam between the host record logic and the HTTP client.
//
// ## Implementations
//
// - reqwest: `infoblox-wapi-http` crate
// - Tests: scripted doubles that record every request
//
// ## Usage
//
// ```rust,ignore
// use infoblox_core::traits::{WapiRequest, WapiTransport};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let transport = /* WapiTransport implementation */;
//
//     let response = transport
//         .execute(WapiRequest::get("record:host/ZG5z...:www.example.com/default"))
//         .await?;
//     println!("{} {}", response.status, response.body);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// HTTP method of a WAPI request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Upper-case method name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical WAPI request described as plain data
///
/// `path` is relative to the WAPI endpoint (`record:host`, or an object
/// reference). The transport owns the base URL, authentication and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct WapiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl WapiRequest {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// GET `path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// POST `body` to `path`
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    /// PUT `body` to `path`
    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(HttpMethod::Put, path).with_body(body)
    }

    /// DELETE `path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Add a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the JSON body
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A WAPI response described as plain data
///
/// Any status is a response; only a failed exchange is a [`TransportError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WapiResponse {
    pub status: u16,
    pub body: String,
}

impl WapiResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The HTTP exchange itself failed (connect, TLS, timeout, body read)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    /// Create a transport error
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Trait for WAPI transport implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks; one
/// transport is shared by every host record operation.
///
/// # Contract
///
/// - Execute exactly one HTTP exchange per call
/// - Do NOT retry
/// - Do NOT follow redirects (3xx must reach the caller as a response)
/// - Send `Accept: application/json`, `Content-Type: application/json` and
///   HTTP Basic auth on every request
/// - Never log credentials
#[async_trait]
pub trait WapiTransport: Send + Sync {
    /// Execute one request and return the raw response
    async fn execute(&self, request: WapiRequest) -> Result<WapiResponse, TransportError>;

    /// Get the transport name (for logging/debugging)
    fn transport_name(&self) -> &'static str;
}
