//! Error types for host record management
//!
//! This module defines all error types used throughout the crate.

use std::fmt;

use thiserror::Error;

use crate::host_record::WapiError;

/// Result type alias for host record operations
pub type Result<T> = std::result::Result<T, Error>;

/// The lifecycle operation a remote error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// POST to the host record collection (and the follow-up read)
    Create,
    /// GET of a single host record by reference
    Read,
    /// PUT to a host record by reference (and the follow-up read)
    Update,
    /// DELETE of a host record by reference
    Delete,
}

impl Operation {
    /// Lowercase name used in log lines and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for host record management
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (unsupported WAPI version, missing credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The transport could not complete the HTTP exchange
    #[error("host record {operation} failed: transport error: {message}")]
    Transport {
        /// Operation that issued the request
        operation: Operation,
        /// Underlying transport error
        message: String,
    },

    /// The server answered with a 3xx status; redirects are never followed
    #[error("host record {operation} failed: unexpected HTTP redirect ({status})")]
    UnexpectedRedirect {
        /// Operation that issued the request
        operation: Operation,
        /// HTTP status code
        status: u16,
    },

    /// The server answered 4xx/5xx with a structured WAPI error body
    #[error("host record {operation} failed: WAPI error ({status}): {error}")]
    Api {
        /// Operation that issued the request
        operation: Operation,
        /// HTTP status code
        status: u16,
        /// Decoded error body
        error: WapiError,
    },

    /// The server answered 4xx/5xx without a structured error body
    #[error("host record {operation} failed: unknown HTTP error ({status}): {body}")]
    UnknownHttp {
        /// Operation that issued the request
        operation: Operation,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The remote record has a shape this crate cannot model
    #[error("host record {operation} failed: invariant violation: {message}")]
    InvariantViolation {
        /// Operation that received the response
        operation: Operation,
        /// What was wrong with the response
        message: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create an invariant violation for the given operation
    pub fn invariant(operation: Operation, msg: impl Into<String>) -> Self {
        Self::InvariantViolation {
            operation,
            message: msg.into(),
        }
    }

    /// The operation a remote error originated from, if any
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Error::Transport { operation, .. }
            | Error::UnexpectedRedirect { operation, .. }
            | Error::Api { operation, .. }
            | Error::UnknownHttp { operation, .. }
            | Error::InvariantViolation { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedRedirect { status, .. }
            | Error::Api { status, .. }
            | Error::UnknownHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 answer, structured or not
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
