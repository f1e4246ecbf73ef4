//! Note signing keys using aws-lc-rs
//!
//! Signer keys use the text form
//! `PRIVATE+KEY+<name>+<hex key hash>+<base64(alg || seed)>`, the same
//! layout as verifier keys with the Ed25519 seed in place of the public key.

use crate::error::{Error, Result};
use crate::note::{cosignature_message, key_hash, KeyAlgorithm, NoteVerifier};
use aws_lc_rs::{
    rand::{SecureRandom, SystemRandom},
    signature::{Ed25519KeyPair, KeyPair},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use std::fmt;
use tlog_types::{decode_base64_canonical, is_valid_signer_name, Checkpoint, NoteSignature};

const SIGNER_PREFIX: &str = "PRIVATE+KEY+";
const SEED_SIZE: usize = 32;

/// A private key producing signature lines for a log or a witness
pub struct NoteSigner {
    name: String,
    key_hash: [u8; 4],
    algorithm: KeyAlgorithm,
    seed: [u8; SEED_SIZE],
    key_pair: Ed25519KeyPair,
}

impl NoteSigner {
    /// Generate a fresh key
    pub fn generate(name: impl Into<String>, algorithm: KeyAlgorithm) -> Result<Self> {
        let mut seed = [0u8; SEED_SIZE];
        SystemRandom::new()
            .fill(&mut seed)
            .map_err(|_| Error::KeyGeneration("failed to generate Ed25519 seed".to_string()))?;
        Self::from_seed(name, algorithm, seed)
    }

    /// Derive a key from a 32-byte Ed25519 seed
    pub fn from_seed(
        name: impl Into<String>,
        algorithm: KeyAlgorithm,
        seed: [u8; SEED_SIZE],
    ) -> Result<Self> {
        let name = name.into();
        if !is_valid_signer_name(&name) {
            return Err(Error::InvalidKey(format!("invalid key name: {:?}", name)));
        }
        let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed)?;
        let key_hash = key_hash(&name, algorithm, key_pair.public_key().as_ref());
        Ok(Self {
            name,
            key_hash,
            algorithm,
            seed,
            key_pair,
        })
    }

    /// Parse signer key text
    pub fn parse(text: &str) -> Result<Self> {
        let rest = text
            .trim()
            .strip_prefix(SIGNER_PREFIX)
            .ok_or_else(|| Error::InvalidKey("signer key must start with PRIVATE+KEY+".to_string()))?;

        let mut parts = rest.splitn(3, '+');
        let (name, hash_hex, encoded) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(hash), Some(key)) => (name, hash, key),
            _ => {
                return Err(Error::InvalidKey(
                    "signer key must have format PRIVATE+KEY+<name>+<hash>+<key>".to_string(),
                ))
            }
        };

        let raw = decode_base64_canonical(encoded)
            .map_err(|e| Error::InvalidKey(format!("invalid key encoding: {}", e)))?;
        let (alg, seed) = raw
            .split_first()
            .ok_or_else(|| Error::InvalidKey("empty key".to_string()))?;
        let algorithm = KeyAlgorithm::from_byte(*alg)?;
        let seed: [u8; SEED_SIZE] = seed
            .try_into()
            .map_err(|_| Error::InvalidKey(format!("seed must be {} bytes", SEED_SIZE)))?;

        let signer = Self::from_seed(name, algorithm, seed)?;
        if hex::encode(signer.key_hash) != hash_hex {
            return Err(Error::InvalidKey(format!(
                "key hash {} does not match key",
                hash_hex
            )));
        }
        Ok(signer)
    }

    /// Encode as signer key text
    pub fn to_text(&self) -> String {
        let mut raw = Vec::with_capacity(1 + SEED_SIZE);
        raw.push(self.algorithm.as_byte());
        raw.extend_from_slice(&self.seed);
        format!(
            "{}{}+{}+{}",
            SIGNER_PREFIX,
            self.name,
            hex::encode(self.key_hash),
            STANDARD.encode(raw)
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// The matching public verifier key
    pub fn verifier(&self) -> Result<NoteVerifier> {
        let public_key: [u8; 32] = self
            .key_pair
            .public_key()
            .as_ref()
            .try_into()
            .map_err(|_| Error::InvalidKey("unexpected Ed25519 public key size".to_string()))?;
        NoteVerifier::new(self.name.clone(), self.algorithm, public_key)
    }

    /// Sign a checkpoint body.
    ///
    /// Cosignature keys stamp the signature with the current time.
    pub fn sign(&self, checkpoint: &Checkpoint) -> Result<NoteSignature> {
        match self.algorithm {
            KeyAlgorithm::Ed25519 => {
                let sig = self.key_pair.sign(checkpoint.to_body().as_bytes());
                Ok(self.signature_line(sig.as_ref().to_vec()))
            }
            KeyAlgorithm::CosignatureV1 => {
                let timestamp = u64::try_from(Utc::now().timestamp())
                    .map_err(|_| Error::Signing("system clock is before 1970".to_string()))?;
                self.cosign_at(checkpoint, timestamp)
            }
        }
    }

    /// Cosign a checkpoint body at an explicit Unix timestamp
    pub fn cosign_at(&self, checkpoint: &Checkpoint, timestamp: u64) -> Result<NoteSignature> {
        if self.algorithm != KeyAlgorithm::CosignatureV1 {
            return Err(Error::Signing(format!(
                "key {} is not a cosignature key",
                self.name
            )));
        }
        let message = cosignature_message(timestamp, &checkpoint.to_body());
        let sig = self.key_pair.sign(message.as_bytes());

        let mut bytes = Vec::with_capacity(8 + sig.as_ref().len());
        bytes.extend_from_slice(&timestamp.to_be_bytes());
        bytes.extend_from_slice(sig.as_ref());
        Ok(self.signature_line(bytes))
    }

    fn signature_line(&self, signature: Vec<u8>) -> NoteSignature {
        NoteSignature {
            name: self.name.clone(),
            key_hash: self.key_hash,
            signature,
        }
    }
}

impl fmt::Debug for NoteSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteSigner")
            .field("name", &self.name)
            .field("key_hash", &hex::encode(self.key_hash))
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
