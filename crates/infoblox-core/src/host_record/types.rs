//! Host record types: the declared record, the local state written back after
//! a read, and the explicit wire schema of each WAPI endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::host_record::mapper::join_fqdn;

/// TTL applied when the declaration does not name one
pub const DEFAULT_TTL: u32 = 600;

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// The host record as declared by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredRecord {
    /// Zone the record lives in (e.g. "example.com")
    pub domain: String,

    /// Subdomain label (e.g. "www"); empty for a zone-apex record
    #[serde(default)]
    pub name: String,

    /// IPv4 address, or a server-side function such as
    /// `func:nextavailableip:10.0.0.0/24`. Passed through unvalidated.
    pub ipv4: String,

    /// TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl DesiredRecord {
    /// Create a declaration with the default TTL
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        ipv4: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            ipv4: ipv4.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Fully-qualified name this declaration maps to
    pub fn fqdn(&self) -> String {
        join_fqdn(&self.name, &self.domain)
    }

    /// Reject declarations that cannot form a request
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(Error::invalid_input("host record domain cannot be empty"));
        }
        if self.ipv4.is_empty() {
            return Err(Error::invalid_input(format!(
                "host record {} has an empty ipv4",
                self.fqdn()
            )));
        }
        Ok(())
    }
}

/// Opaque server-assigned object reference (`_ref`)
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Wrap a reference, rejecting the empty string
    pub fn new(reference: impl Into<String>) -> Result<Self> {
        let reference = reference.into();
        if reference.is_empty() {
            return Err(Error::invalid_input("host record reference cannot be empty"));
        }
        Ok(Self(reference))
    }

    /// The reference as sent in request paths
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourceId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local fields written back after a successful read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecordState {
    pub id: ResourceId,
    pub fqdn: String,
    pub name: String,
    pub domain: String,
    pub ipv4: String,
    pub ttl: u32,
    pub use_ttl: bool,
    pub view: String,
}

/// One address in a request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4AddrSpec {
    pub ipv4addr: String,
}

/// `POST /record:host` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecordCreate {
    pub name: String,
    pub ipv4addrs: Vec<Ipv4AddrSpec>,
    pub ttl: u32,
    pub use_ttl: bool,
}

/// `PUT /{ref}` body; the address is the only mutable field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecordUpdate {
    pub ipv4addrs: Vec<Ipv4AddrSpec>,
}

/// One address of a host record as returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIpv4Addr {
    #[serde(rename = "_ref", default)]
    pub reference: String,
    #[serde(default)]
    pub host: String,
    pub ipv4addr: String,
    #[serde(default)]
    pub configure_for_dhcp: bool,
}

/// `GET /{ref}?_return_fields+=ttl,use_ttl` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHostRecord {
    #[serde(rename = "_ref", default)]
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub view: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub use_ttl: bool,
    #[serde(default)]
    pub ipv4addrs: Vec<RemoteIpv4Addr>,
}

/// Structured WAPI error body (4xx/5xx)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WapiError {
    #[serde(rename = "Error", alias = "error", default)]
    pub error: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub text: String,
}

impl WapiError {
    /// A body counts as a structured error only when `Error` is non-empty
    pub fn is_structured(&self) -> bool {
        !self.error.is_empty()
    }
}

impl fmt::Display for WapiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {}): {}", self.error, self.code, self.text)
    }
}
