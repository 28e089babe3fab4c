// # Host Record Resource
//
// Create, read, update and delete of one Infoblox host record over an
// injected `WapiTransport`.
//
// ## Lifecycle
//
// ```text
// Absent --create--> Present --update--> Present --delete--> Absent
// ```
//
// Create and update are each two HTTP calls (the write, then a read of the
// record so local state reflects what the server stored). No call is retried.
// If the write succeeds and the read fails, the error is returned and a WARN
// line names the reference so the record can be reconciled by hand.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Error, Operation, Result};
use crate::host_record::classify::check;
use crate::host_record::identity::extract_ref;
use crate::host_record::mapper::{from_remote, to_create_body, to_update_body};
use crate::host_record::types::{DesiredRecord, HostRecordState, RemoteHostRecord, ResourceId};
use crate::traits::{WapiRequest, WapiTransport};

/// WAPI object type of host records
pub const HOST_RECORD_OBJECT: &str = "record:host";

/// Fields requested on top of the defaults when reading a record
pub const RETURN_FIELDS: &str = "ttl,use_ttl";

/// CRUD operations on Infoblox host records
#[derive(Clone)]
pub struct HostRecordResource {
    transport: Arc<dyn WapiTransport>,
}

impl HostRecordResource {
    /// Create a resource that issues every call through `transport`
    pub fn new(transport: Arc<dyn WapiTransport>) -> Self {
        Self { transport }
    }

    /// Create the record, then read it back
    pub async fn create(&self, desired: &DesiredRecord) -> Result<HostRecordState> {
        desired.validate()?;

        let body = serde_json::to_value(to_create_body(desired))?;
        info!("Creating host record {} -> {}", desired.fqdn(), desired.ipv4);

        let response = check(
            Operation::Create,
            self.transport
                .execute(WapiRequest::post(HOST_RECORD_OBJECT, body))
                .await,
        )?;
        let id = extract_ref(&response.body)?;
        debug!("Created host record {} as {}", desired.fqdn(), id);

        self.read_back(Operation::Create, &id).await
    }

    /// Read the record identified by `id`
    pub async fn read(&self, id: &ResourceId) -> Result<HostRecordState> {
        self.fetch(Operation::Read, id).await
    }

    /// Change the record's address, then read it back
    ///
    /// Only the address is sent; name, domain and TTL are immutable here.
    pub async fn update(&self, id: &ResourceId, desired: &DesiredRecord) -> Result<HostRecordState> {
        desired.validate()?;

        let body = serde_json::to_value(to_update_body(desired))?;
        info!("Updating host record {} -> {}", id, desired.ipv4);

        check(
            Operation::Update,
            self.transport
                .execute(WapiRequest::put(id.as_str(), body))
                .await,
        )?;

        self.read_back(Operation::Update, id).await
    }

    /// Delete the record identified by `id`
    pub async fn delete(&self, id: &ResourceId) -> Result<()> {
        info!("Deleting host record {}", id);

        check(
            Operation::Delete,
            self.transport
                .execute(WapiRequest::delete(id.as_str()))
                .await,
        )?;
        Ok(())
    }

    /// Get the transport name (for logging/debugging)
    pub fn transport_name(&self) -> &'static str {
        self.transport.transport_name()
    }

    /// Follow-up read after a successful write
    async fn read_back(&self, operation: Operation, id: &ResourceId) -> Result<HostRecordState> {
        match self.fetch(Operation::Read, id).await {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(
                    "Host record {} succeeded on the server but reading it back failed; \
                     reference {} needs manual reconciliation: {}",
                    operation, id, e
                );
                Err(e)
            }
        }
    }

    async fn fetch(&self, operation: Operation, id: &ResourceId) -> Result<HostRecordState> {
        let request = WapiRequest::get(id.as_str()).with_query("_return_fields+", RETURN_FIELDS);
        let response = check(operation, self.transport.execute(request).await)?;

        let remote: RemoteHostRecord = serde_json::from_str(&response.body).map_err(|e| {
            Error::invariant(
                operation,
                format!("unexpected host record shape ({}): {}", e, response.body),
            )
        })?;

        from_remote(id.clone(), remote)
    }
}

impl std::fmt::Debug for HostRecordResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostRecordResource")
            .field("transport", &self.transport.transport_name())
            .finish()
    }
}
