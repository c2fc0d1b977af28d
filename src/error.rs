//! Request-path error taxonomy.
//!
//! All three conditions are deterministic given the same request and
//! configuration, and recoverable by the caller; none are fatal to the
//! service process.

use serde_json::Value;
use thiserror::Error;

use crate::version::ApiVersion;

/// Errors surfaced while resolving a version or dispatching an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    /// The token does not parse under the service's configured format.
    #[error("invalid API version token: {token:?}")]
    InvalidVersionFormat { token: String },

    /// The token parses but no such version is declared.
    #[error("unsupported API version: {version}")]
    UnsupportedVersion { version: ApiVersion },

    /// The resolved version has no handler for the requested operation.
    #[error("no handler for operation {operation:?} at version {version}")]
    NoMatchingOperation {
        operation: String,
        version: ApiVersion,
    },
}

impl VersionError {
    /// Stable machine-readable code used in error bodies and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            VersionError::InvalidVersionFormat { .. } => "invalid_version_format",
            VersionError::UnsupportedVersion { .. } => "unsupported_version",
            VersionError::NoMatchingOperation { .. } => "no_matching_operation",
        }
    }

    /// HTTP status the condition maps to at the transport boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            VersionError::InvalidVersionFormat { .. } => 400,
            VersionError::UnsupportedVersion { .. } => 400,
            VersionError::NoMatchingOperation { .. } => 404,
        }
    }

    /// Structured client-facing error body.
    pub fn response_body(&self) -> Value {
        serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        })
    }
}
