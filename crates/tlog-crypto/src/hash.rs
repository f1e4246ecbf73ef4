//! Incremental SHA-256 over aws-lc-rs, used for note key hashes

use aws_lc_rs::digest::{Context, SHA256};
use tlog_types::Sha256Hash;

/// Incremental SHA-256 hasher
pub struct Sha256Hasher {
    context: Context,
}

impl Sha256Hasher {
    /// Create a new SHA-256 hasher
    pub fn new() -> Self {
        Self {
            context: Context::new(&SHA256),
        }
    }

    /// Update the hasher with data
    pub fn update(&mut self, data: &[u8]) {
        self.context.update(data);
    }

    /// Update the hasher with data, returning it for chaining
    pub fn chain(mut self, data: &[u8]) -> Self {
        self.update(data);
        self
    }

    /// Finalize and get the digest
    pub fn finalize(self) -> Sha256Hash {
        let digest = self.context.finish();
        let mut result = [0u8; 32];
        result.copy_from_slice(digest.as_ref());
        Sha256Hash::from_bytes(result)
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}
