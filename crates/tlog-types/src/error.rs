//! Error types for tlog-types

use thiserror::Error;

/// Errors that can occur in tlog-types
#[derive(Error, Debug)]
pub enum Error {
    /// Base64 decoding error
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid hash or text encoding
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Invalid checkpoint format
    #[error("Invalid checkpoint format: {0}")]
    InvalidCheckpoint(String),

    /// Invalid proof container
    #[error("Invalid proof container: {0}")]
    InvalidProof(String),
}

/// Result type for tlog-types operations
pub type Result<T> = std::result::Result<T, Error>;
