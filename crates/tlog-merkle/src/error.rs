//! Error types for tlog-merkle

use thiserror::Error;

/// Errors that can occur in Merkle tree operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid tree size
    #[error("Invalid tree size: {0}")]
    InvalidTreeSize(String),

    /// Invalid leaf index
    #[error("Invalid leaf index: {0}")]
    InvalidLeafIndex(String),

    /// Proof shape does not match the tree
    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    /// Recomputed root differs from the expected root
    #[error("Root mismatch: expected {expected}, got {actual}")]
    RootMismatch { expected: String, actual: String },
}

/// Result type for Merkle tree operations
pub type Result<T> = std::result::Result<T, Error>;
