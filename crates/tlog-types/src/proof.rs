//! Binary proof container embedded in a trust document
//!
//! Layout:
//!
//! ```text
//! +----------------+-------+--------------------------+---------------------+
//! | index (u64 BE) | count | count x 32-byte hashes   | checkpoint bytes... |
//! +----------------+-------+--------------------------+---------------------+
//! ```
//!
//! The hash count is a single byte and never exceeds [`MAX_PROOF_HASHES`], the
//! longest audit path a tree of `u64` size can have. The checkpoint is the
//! raw signed note and runs to the end of the container, so the layout is
//! unambiguous without a second length prefix.

use crate::encoding::{decode_base64_canonical, Sha256Hash, HASH_SIZE};
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Maximum number of hashes in an inclusion proof
pub const MAX_PROOF_HASHES: usize = 64;

const INDEX_SIZE: usize = 8;
const HEADER_SIZE: usize = INDEX_SIZE + 1;

/// An inclusion proof bundled with the checkpoint it was computed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TLogProof {
    /// Index of the leaf in the log
    pub index: u64,
    /// Sibling hashes, ordered from the leaf up to the root
    pub hashes: Vec<Sha256Hash>,
    /// Raw signed checkpoint bytes
    pub checkpoint: Vec<u8>,
}

impl TLogProof {
    /// Encode into the binary container.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.hashes.len() > MAX_PROOF_HASHES {
            return Err(Error::InvalidProof(format!(
                "proof has {} hashes, at most {} are allowed",
                self.hashes.len(),
                MAX_PROOF_HASHES
            )));
        }
        if self.checkpoint.is_empty() {
            return Err(Error::InvalidProof("checkpoint is empty".to_string()));
        }

        let mut out =
            Vec::with_capacity(HEADER_SIZE + self.hashes.len() * HASH_SIZE + self.checkpoint.len());
        out.extend_from_slice(&self.index.to_be_bytes());
        out.push(self.hashes.len() as u8);
        for hash in &self.hashes {
            out.extend_from_slice(hash.as_slice());
        }
        out.extend_from_slice(&self.checkpoint);
        Ok(out)
    }

    /// Decode from the binary container.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::InvalidProof(format!(
                "container truncated: {} bytes, header needs {}",
                bytes.len(),
                HEADER_SIZE
            )));
        }

        let mut index = [0u8; INDEX_SIZE];
        index.copy_from_slice(&bytes[..INDEX_SIZE]);
        let index = u64::from_be_bytes(index);

        let count = bytes[INDEX_SIZE] as usize;
        if count > MAX_PROOF_HASHES {
            return Err(Error::InvalidProof(format!(
                "hash count {} exceeds maximum of {}",
                count, MAX_PROOF_HASHES
            )));
        }

        let hashes_end = HEADER_SIZE + count * HASH_SIZE;
        if bytes.len() < hashes_end {
            return Err(Error::InvalidProof(format!(
                "container truncated: {} hashes need {} bytes, got {}",
                count,
                hashes_end,
                bytes.len()
            )));
        }

        let hashes = bytes[HEADER_SIZE..hashes_end]
            .chunks_exact(HASH_SIZE)
            .map(Sha256Hash::try_from_slice)
            .collect::<Result<Vec<_>>>()?;

        let checkpoint = bytes[hashes_end..].to_vec();
        if checkpoint.is_empty() {
            return Err(Error::InvalidProof("checkpoint is empty".to_string()));
        }

        Ok(TLogProof {
            index,
            hashes,
            checkpoint,
        })
    }

    /// Encode the container as standard base64, the form stored in a JSON string.
    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.encode()?))
    }

    /// Decode the container from its base64 form.
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = decode_base64_canonical(s)
            .map_err(|e| Error::InvalidProof(format!("invalid base64: {}", e)))?;
        Self::decode(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> TLogProof {
        TLogProof {
            index: 4,
            hashes: vec![Sha256Hash::from_bytes([1; 32]), Sha256Hash::from_bytes([2; 32])],
            checkpoint: b"log\n5\nroot\n\n\xe2\x80\x94 log sig\n".to_vec(),
        }
    }

    #[test]
    fn test_layout() {
        let encoded = sample().encode().unwrap();
        assert_eq!(&encoded[..8], &[0, 0, 0, 0, 0, 0, 0, 4]);
        assert_eq!(encoded[8], 2);
        assert_eq!(&encoded[9..41], &[1; 32]);
        assert_eq!(&encoded[41..73], &[2; 32]);
        assert_eq!(&encoded[73..], sample().checkpoint.as_slice());
    }

    #[test]
    fn test_base64_roundtrip() {
        let proof = sample();
        let decoded = TLogProof::from_base64(&proof.to_base64().unwrap()).unwrap();
        assert_eq!(decoded, proof);
    }

    #[test]
    fn test_empty_path() {
        let proof = TLogProof {
            index: 0,
            hashes: vec![],
            checkpoint: b"x".to_vec(),
        };
        let encoded = proof.encode().unwrap();
        assert_eq!(encoded.len(), 10);
        assert_eq!(TLogProof::decode(&encoded).unwrap(), proof);
    }

    #[test]
    fn test_truncated_containers() {
        let encoded = sample().encode().unwrap();
        // header only, cut inside the hashes, and no checkpoint
        for len in [0, 5, 9, 40, 73] {
            assert!(
                TLogProof::decode(&encoded[..len]).is_err(),
                "length {} should not decode",
                len
            );
        }
    }

    #[test]
    fn test_count_limit() {
        let mut bytes = vec![0u8; 8];
        bytes.push(65);
        bytes.extend(std::iter::repeat(0u8).take(65 * 32 + 1));
        assert!(TLogProof::decode(&bytes).is_err());

        let proof = TLogProof {
            index: 0,
            hashes: vec![Sha256Hash::default(); 65],
            checkpoint: b"x".to_vec(),
        };
        assert!(proof.encode().is_err());
    }

    #[test]
    fn test_rejects_bad_base64() {
        assert!(TLogProof::from_base64("not base64!").is_err());
    }

    proptest! {
        #[test]
        fn prop_decode_encode_roundtrip(
            index in any::<u64>(),
            hashes in proptest::collection::vec(any::<[u8; 32]>(), 0..=MAX_PROOF_HASHES),
            checkpoint in proptest::collection::vec(any::<u8>(), 1..256),
        ) {
            let proof = TLogProof {
                index,
                hashes: hashes.into_iter().map(Sha256Hash::from_bytes).collect(),
                checkpoint,
            };
            let decoded = TLogProof::decode(&proof.encode().unwrap()).unwrap();
            prop_assert_eq!(decoded, proof);
        }
    }
}
