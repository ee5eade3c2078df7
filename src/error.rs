//! Error types for the watch store.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for the document store and its backends.
///
/// Every store operation returns `Result<T>`. The HTTP layer maps each
/// variant to exactly one response, see [`crate::http::ApiError`].
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No document carries the requested business identifier.
    #[error("Watch not found: {0}")]
    NotFound(String),

    /// A write was rejected.
    ///
    /// Raised when:
    /// - a required field is missing or has the wrong type
    /// - a bounded field is out of range (`rating`, review `rating`)
    /// - `sku` or a caller-supplied `id` is already taken
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend storage is unreachable or returned an error.
    ///
    /// Common causes:
    /// - Redis connection lost or pool exhausted
    /// - Network timeout
    /// - Backend protocol error
    ///
    /// No retry is attempted; the request fails.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Encoding a document for storage failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored bytes could not be decoded.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Stored bytes do not carry the document envelope magic.
    #[error("Invalid stored document: {0}")]
    InvalidDocument(String),

    /// Stored document was written by a different schema version.
    #[error("Document version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from stored document)
        found: u32,
    },

    /// Invalid configuration at startup.
    #[error("Config error: {0}")]
    Config(String),
}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            StoreError::Unavailable(e.to_string())
        } else {
            // Payload shape errors: missing field, wrong type, bad enum value
            StoreError::Validation(e.to_string())
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
