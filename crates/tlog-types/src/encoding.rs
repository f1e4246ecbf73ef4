//! Hash and base64 encoding helpers
//!
//! Checkpoints and proof containers carry hashes in standard base64. Because
//! signatures are computed over the literal text, decoding here is strict:
//! an input is only accepted if re-encoding the decoded bytes reproduces it.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Size of a SHA-256 digest in bytes
pub const HASH_SIZE: usize = 32;

/// Decode standard base64, rejecting any non-canonical spelling.
///
/// The base64 engine tolerates non-zero trailing bits; a text format that is
/// signed byte-for-byte cannot, so the decoded bytes are re-encoded and
/// compared against the input.
pub fn decode_base64_canonical(s: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD.decode(s)?;
    if STANDARD.encode(&bytes) != s {
        return Err(Error::InvalidEncoding(format!(
            "non-canonical base64 encoding: {}",
            s
        )));
    }
    Ok(bytes)
}

/// SHA-256 hash digest (32 bytes)
///
/// Used for Merkle leaf and node hashes as well as checkpoint root hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sha256Hash([u8; HASH_SIZE]);

impl Sha256Hash {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Sha256Hash(bytes)
    }

    /// Try to create from a byte slice
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            Error::InvalidEncoding(format!(
                "SHA-256 hash must be {} bytes, got {}",
                HASH_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Sha256Hash(arr))
    }

    /// Parse from hex-encoded string
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| Error::InvalidEncoding(format!("invalid hex: {}", e)))?;
        Self::try_from_slice(&bytes)
    }

    /// Parse from canonical base64
    pub fn from_base64(s: &str) -> Result<Self> {
        Self::try_from_slice(&decode_base64_canonical(s)?)
    }

    /// Encode as hex string (lowercase)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Encode as base64 string
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Get as a byte slice
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_SIZE]> for Sha256Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Sha256Hash(bytes)
    }
}

impl std::fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hash_hex_roundtrip() {
        let hash_hex = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        let hash = Sha256Hash::from_hex(hash_hex).unwrap();
        assert_eq!(hash.to_hex(), hash_hex);
        assert_eq!(hash.to_string(), hash_hex);
    }

    #[test]
    fn test_sha256_hash_base64() {
        let hash = Sha256Hash::from_bytes([7u8; 32]);
        let decoded = Sha256Hash::from_base64(&hash.to_base64()).unwrap();
        assert_eq!(hash, decoded);
    }

    #[test]
    fn test_sha256_hash_wrong_length() {
        assert!(Sha256Hash::try_from_slice(&[0u8; 31]).is_err());
        assert!(Sha256Hash::from_base64("AAAA").is_err());
    }

    #[test]
    fn test_non_canonical_base64_rejected() {
        // "AB==" and "AA==" both decode to a single zero byte; only the latter
        // is the canonical spelling.
        assert_eq!(decode_base64_canonical("AA==").unwrap(), vec![0u8]);
        assert!(decode_base64_canonical("AB==").is_err());
        assert!(decode_base64_canonical("AA").is_err());
    }
}
