//! Error types for the tiles crate

/// Result type for tile operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading tiles or building proofs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested tile or checkpoint does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(String),

    /// The log base URL or a derived tile URL is invalid
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The leaf index lies outside the tree
    #[error("Leaf index {index} is out of range for tree size {size}")]
    IndexOutOfRange { index: u64, size: u64 },

    /// A tile's contents do not match its declared width
    #[error("Invalid tile: {0}")]
    InvalidTile(String),

    /// Merkle range math error
    #[error("Merkle error: {0}")]
    Merkle(#[from] tlog_merkle::Error),
}

impl Error {
    /// Whether the failure came from the storage backend rather than the
    /// request itself. Callers may retry these.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Io(_) | Error::Http(_) | Error::InvalidUrl(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
