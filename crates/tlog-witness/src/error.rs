//! Error types for tlog-witness

use thiserror::Error;

/// Errors raised while reading a witness policy.
///
/// Evaluation never fails; an unsatisfied quorum is reported as `false`.
#[derive(Error, Debug)]
pub enum Error {
    /// A policy line could not be parsed
    #[error("policy line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// The policy as a whole is inconsistent
    #[error("invalid policy: {0}")]
    Invalid(String),

    /// A witness or log key could not be read
    #[error("policy line {line}: invalid key: {source}")]
    Key {
        line: usize,
        #[source]
        source: tlog_crypto::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
