//! Error types for trust document operations

use thiserror::Error;

/// Errors that can occur while reading or canonicalizing a trust document
#[derive(Debug, Error)]
pub enum Error {
    /// JSON parsing error
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the document failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The value has no canonical JSON form
    #[error("cannot canonicalize: {0}")]
    Encoding(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(String),

    /// `signed.version` is not a non-negative integer
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    /// The field name belongs to the metadata schema
    #[error("field is reserved: {0}")]
    ReservedField(String),
}

/// Result type for trust document operations
pub type Result<T> = std::result::Result<T, Error>;
