//! Classification of WAPI responses into success or a typed failure.
//!
//! Every response the host record resource receives goes through [`check`]
//! before any field of it is trusted.

use tracing::{debug, warn};

use crate::error::{Error, Operation, Result};
use crate::host_record::types::WapiError;
use crate::traits::{TransportError, WapiResponse};

/// Result of classifying one HTTP exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    TransportFailure,
    UnexpectedRedirect,
    ApiFailure,
    UnknownHttpFailure,
}

/// Decision table, evaluated top to bottom
///
/// | condition                                 | outcome              |
/// |-------------------------------------------|----------------------|
/// | transport failed                          | `TransportFailure`   |
/// | `300 <= status < 400`                     | `UnexpectedRedirect` |
/// | `status >= 400` and structured error body | `ApiFailure`         |
/// | `status >= 400`                           | `UnknownHttpFailure` |
/// | otherwise                                 | `Success`            |
pub fn classify_status(transport_failed: bool, status: u16, structured: bool) -> Outcome {
    if transport_failed {
        Outcome::TransportFailure
    } else if (300..400).contains(&status) {
        Outcome::UnexpectedRedirect
    } else if status >= 400 && structured {
        Outcome::ApiFailure
    } else if status >= 400 {
        Outcome::UnknownHttpFailure
    } else {
        Outcome::Success
    }
}

/// Classify the result of a transport call made on behalf of `operation`
///
/// Passes the response through on success, otherwise returns the error
/// variant matching the [`Outcome`].
pub fn check(
    operation: Operation,
    result: std::result::Result<WapiResponse, TransportError>,
) -> Result<WapiResponse> {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            warn!("host record {}: transport error: {}", operation, e);
            return Err(Error::Transport {
                operation,
                message: e.to_string(),
            });
        }
    };

    debug!(
        "host record {}: HTTP {} body: {}",
        operation, response.status, response.body
    );

    let structured = if response.status >= 400 {
        serde_json::from_str::<WapiError>(&response.body)
            .ok()
            .filter(WapiError::is_structured)
    } else {
        None
    };

    match classify_status(false, response.status, structured.is_some()) {
        Outcome::Success => Ok(response),
        Outcome::UnexpectedRedirect => {
            warn!(
                "host record {}: unexpected redirect (HTTP {})",
                operation, response.status
            );
            Err(Error::UnexpectedRedirect {
                operation,
                status: response.status,
            })
        }
        Outcome::ApiFailure => {
            let error = structured.unwrap_or_default();
            warn!(
                "host record {}: WAPI error (HTTP {}): {}",
                operation, response.status, error
            );
            Err(Error::Api {
                operation,
                status: response.status,
                error,
            })
        }
        Outcome::UnknownHttpFailure => {
            warn!(
                "host record {}: unknown HTTP error (HTTP {}): {}",
                operation, response.status, response.body
            );
            Err(Error::UnknownHttp {
                operation,
                status: response.status,
                body: response.body,
            })
        }
        // Only reachable with transport_failed = true, handled above
        Outcome::TransportFailure => Err(Error::Transport {
            operation,
            message: "transport failure".to_string(),
        }),
    }
}
