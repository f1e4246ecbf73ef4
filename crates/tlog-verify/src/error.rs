//! Error types for issuing and verifying proofs
//!
//! Every failure of the issue and verify workflows maps to one variant here;
//! component errors convert with `From` or are mapped where the workflow
//! knows which gate failed.

use thiserror::Error;

/// Errors that can occur while issuing or verifying a proof
#[derive(Error, Debug)]
pub enum Error {
    /// The document has no canonical form
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The leaf index does not address a leaf of the tree
    #[error("Index out of range: {0}")]
    IndexOutOfRange(String),

    /// A tile or checkpoint could not be read from the log
    #[error("Tile fetch error: {0}")]
    TileFetch(String),

    /// The inclusion proof has the wrong shape
    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    /// The document carries no proof
    #[error("Transparency log proof missing from document")]
    ProofMissing,

    /// The embedded proof container is malformed
    #[error("Proof decode error: {0}")]
    ProofDecode(String),

    /// The checkpoint could not be parsed or does not belong to the log
    #[error("Checkpoint parse error: {0}")]
    CheckpointParse(String),

    /// No checkpoint signature from the log key
    #[error("Unknown signer: {0}")]
    UnknownSigner(String),

    /// The log signature on the checkpoint is invalid
    #[error("Signature verification failed: {0}")]
    SignatureVerification(String),

    /// The witness policy could not be parsed
    #[error("Policy parse error: {0}")]
    PolicyParse(#[from] tlog_witness::Error),

    /// The checkpoint cosignatures do not satisfy the witness policy
    #[error("Checkpoint could not be verified by witness policy")]
    WitnessQuorumNotMet,

    /// The proof does not lead from the document to the checkpoint root
    #[error("Inclusion proof mismatch: {0}")]
    InclusionProofMismatch(String),

    /// A note verifier key could not be parsed
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The trust document is not valid metadata
    #[error("Document error: {0}")]
    Document(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tlog_tuf::Error> for Error {
    fn from(err: tlog_tuf::Error) -> Self {
        match err {
            tlog_tuf::Error::Encoding(msg) => Error::Encoding(msg),
            tlog_tuf::Error::Io(e) => Error::Io(e),
            other => Error::Document(other.to_string()),
        }
    }
}

impl From<tlog_tiles::Error> for Error {
    fn from(err: tlog_tiles::Error) -> Self {
        match err {
            tlog_tiles::Error::IndexOutOfRange { .. } => Error::IndexOutOfRange(err.to_string()),
            tlog_tiles::Error::Merkle(e) => Error::MalformedProof(e.to_string()),
            other => Error::TileFetch(other.to_string()),
        }
    }
}

impl From<tlog_crypto::Error> for Error {
    fn from(err: tlog_crypto::Error) -> Self {
        match err {
            tlog_crypto::Error::UnknownSigner(msg) => Error::UnknownSigner(msg),
            tlog_crypto::Error::SignatureVerification(msg) => Error::SignatureVerification(msg),
            tlog_crypto::Error::OriginMismatch { .. } => Error::CheckpointParse(err.to_string()),
            tlog_crypto::Error::InvalidKey(msg) => Error::InvalidKey(msg),
            tlog_crypto::Error::Base64(e) => Error::InvalidKey(e.to_string()),
            other => Error::SignatureVerification(other.to_string()),
        }
    }
}

impl From<tlog_merkle::Error> for Error {
    fn from(err: tlog_merkle::Error) -> Self {
        match err {
            tlog_merkle::Error::RootMismatch { .. } => {
                Error::InclusionProofMismatch(err.to_string())
            }
            other => Error::MalformedProof(other.to_string()),
        }
    }
}

/// Result type for proof operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_error_mapping() {
        let err: Error = tlog_tiles::Error::NotFound("tile/0/000".into()).into();
        assert!(matches!(err, Error::TileFetch(_)));

        let err: Error = tlog_tiles::Error::IndexOutOfRange { index: 9, size: 3 }.into();
        assert!(matches!(err, Error::IndexOutOfRange(_)));

        let err: Error = tlog_crypto::Error::OriginMismatch {
            expected: "a".into(),
            actual: "b".into(),
        }
        .into();
        assert!(matches!(err, Error::CheckpointParse(_)));

        let err: Error = tlog_merkle::Error::MalformedProof("short".into()).into();
        assert!(matches!(err, Error::MalformedProof(_)));

        let err: Error = tlog_tuf::Error::Encoding("5.5".into()).into();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
