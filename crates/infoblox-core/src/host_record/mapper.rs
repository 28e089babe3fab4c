//! Mapping between declared host record fields and the WAPI wire schema.

use crate::error::{Error, Operation, Result};
use crate::host_record::types::{
    DesiredRecord, HostRecordCreate, HostRecordState, HostRecordUpdate, Ipv4AddrSpec,
    RemoteHostRecord, ResourceId,
};

/// Join subdomain and domain into a fully-qualified name
///
/// Always `name.domain`. An empty subdomain yields `.domain`, which
/// [`split_fqdn`] maps back to `("", domain)`.
pub fn join_fqdn(name: &str, domain: &str) -> String {
    format!("{}.{}", name, domain)
}

/// Split a fully-qualified name into `(name, domain)` at the first dot
///
/// A name without a dot yields the whole string as name and an empty domain.
pub fn split_fqdn(fqdn: &str) -> (String, String) {
    match fqdn.split_once('.') {
        Some((name, domain)) => (name.to_string(), domain.to_string()),
        None => (fqdn.to_string(), String::new()),
    }
}

/// Body for `POST /record:host`; the TTL is always explicit
pub fn to_create_body(desired: &DesiredRecord) -> HostRecordCreate {
    HostRecordCreate {
        name: desired.fqdn(),
        ipv4addrs: vec![Ipv4AddrSpec {
            ipv4addr: desired.ipv4.clone(),
        }],
        ttl: desired.ttl,
        use_ttl: true,
    }
}

/// Body for `PUT /{ref}`; name, domain and TTL are never sent
pub fn to_update_body(desired: &DesiredRecord) -> HostRecordUpdate {
    HostRecordUpdate {
        ipv4addrs: vec![Ipv4AddrSpec {
            ipv4addr: desired.ipv4.clone(),
        }],
    }
}

/// Map a read response back into local state
///
/// Only the first address is consumed. A record with no address at all is an
/// invariant violation.
pub fn from_remote(id: ResourceId, remote: RemoteHostRecord) -> Result<HostRecordState> {
    let first = remote.ipv4addrs.into_iter().next().ok_or_else(|| {
        Error::invariant(
            Operation::Read,
            format!("host record {} ({}) has no ipv4addrs", remote.name, id),
        )
    })?;

    let (name, domain) = split_fqdn(&remote.name);

    Ok(HostRecordState {
        id,
        fqdn: remote.name,
        name,
        domain,
        ipv4: first.ipv4addr,
        ttl: remote.ttl.unwrap_or(0),
        use_ttl: remote.use_ttl,
        view: remote.view,
    })
}
