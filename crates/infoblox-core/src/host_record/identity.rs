//! Object reference extraction from create responses.

use crate::error::{Error, Operation, Result};
use crate::host_record::types::ResourceId;

/// Decode the reference returned by `POST /record:host`
///
/// The create endpoint answers with the new reference as a single JSON
/// string literal, e.g. `"record:host/ZG5z...:www.example.com/default"`.
pub fn extract_ref(body: &str) -> Result<ResourceId> {
    let reference: String = serde_json::from_str(body.trim()).map_err(|e| {
        Error::invariant(
            Operation::Create,
            format!("create response is not a JSON string ({}): {}", e, body),
        )
    })?;

    if reference.is_empty() {
        return Err(Error::invariant(
            Operation::Create,
            "create response carried an empty reference",
        ));
    }

    ResourceId::new(reference)
}
