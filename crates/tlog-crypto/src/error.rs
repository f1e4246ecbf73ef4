//! Error types for tlog-crypto

use thiserror::Error;

/// Errors that can occur in key handling, signing and verification
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or inconsistent key text
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key generation error
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Signing error
    #[error("Signing error: {0}")]
    Signing(String),

    /// No signature on the note matches a known key name and key hash
    #[error("Unknown signer: {0}")]
    UnknownSigner(String),

    /// A signature matched a known key but did not verify
    #[error("Signature verification failed: {0}")]
    SignatureVerification(String),

    /// The checkpoint origin differs from the log key name
    #[error("Origin mismatch: expected {expected}, got {actual}")]
    OriginMismatch { expected: String, actual: String },

    /// Base64 error
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// AWS-LC-RS error
    #[error("Crypto error: {0}")]
    AwsLc(String),
}

impl From<aws_lc_rs::error::Unspecified> for Error {
    fn from(_: aws_lc_rs::error::Unspecified) -> Self {
        Error::AwsLc("unspecified error".to_string())
    }
}

impl From<aws_lc_rs::error::KeyRejected> for Error {
    fn from(e: aws_lc_rs::error::KeyRejected) -> Self {
        Error::InvalidKey(e.to_string())
    }
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;
