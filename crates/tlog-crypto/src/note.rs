//! Signed note verifier keys
//!
//! A verifier key is written as `<name>+<hex key hash>+<base64(alg || key)>`,
//! following https://c2sp.org/signed-note. The key hash is the first four
//! bytes of `SHA-256(name || "\n" || alg || key)` and is what lets a
//! verifier pick its own signature lines out of a note.
//!
//! Two algorithms are supported: plain Ed25519 note signatures (`0x01`) used
//! by logs, and https://c2sp.org/tlog-cosignature (`0x04`) used by witnesses.

use crate::error::{Error, Result};
use crate::hash::Sha256Hasher;
use aws_lc_rs::signature::{UnparsedPublicKey, ED25519};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use std::str::FromStr;
use tlog_types::{decode_base64_canonical, is_valid_signer_name, Checkpoint, NoteSignature};

/// First line of every cosigned message
pub const COSIGNATURE_HEADER: &str = "cosignature/v1";

const PUBLIC_KEY_SIZE: usize = 32;
const ED25519_SIGNATURE_SIZE: usize = 64;
const TIMESTAMP_SIZE: usize = 8;

/// Signature algorithm identifier carried in the first key byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// Ed25519 over the note body
    Ed25519,
    /// Ed25519 over a timestamped cosignature message
    CosignatureV1,
}

impl KeyAlgorithm {
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(KeyAlgorithm::Ed25519),
            0x04 => Ok(KeyAlgorithm::CosignatureV1),
            other => Err(Error::InvalidKey(format!(
                "unsupported key algorithm 0x{:02x}",
                other
            ))),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            KeyAlgorithm::Ed25519 => 0x01,
            KeyAlgorithm::CosignatureV1 => 0x04,
        }
    }
}

/// Compute the 4-byte key hash identifying a key in signature lines
pub fn key_hash(name: &str, algorithm: KeyAlgorithm, public_key: &[u8]) -> [u8; 4] {
    let digest = Sha256Hasher::new()
        .chain(name.as_bytes())
        .chain(b"\n")
        .chain(&[algorithm.as_byte()])
        .chain(public_key)
        .finalize();
    let mut hash = [0u8; 4];
    hash.copy_from_slice(&digest.as_slice()[..4]);
    hash
}

/// A public key able to verify signature lines on a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteVerifier {
    name: String,
    key_hash: [u8; 4],
    algorithm: KeyAlgorithm,
    public_key: [u8; PUBLIC_KEY_SIZE],
}

impl NoteVerifier {
    /// Build a verifier from its parts, deriving the key hash
    pub fn new(
        name: impl Into<String>,
        algorithm: KeyAlgorithm,
        public_key: [u8; PUBLIC_KEY_SIZE],
    ) -> Result<Self> {
        let name = name.into();
        if !is_valid_signer_name(&name) {
            return Err(Error::InvalidKey(format!("invalid key name: {:?}", name)));
        }
        let key_hash = key_hash(&name, algorithm, &public_key);
        Ok(Self {
            name,
            key_hash,
            algorithm,
            public_key,
        })
    }

    /// Parse the text form `<name>+<hex key hash>+<base64(alg || key)>`.
    ///
    /// Surrounding whitespace is ignored so that key files with a trailing
    /// newline load as-is. The embedded key hash must match the one derived
    /// from the name and key.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let mut parts = text.splitn(3, '+');
        let (name, hash_hex, encoded) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(hash), Some(key)) => (name, hash, key),
            _ => {
                return Err(Error::InvalidKey(
                    "verifier key must have format <name>+<hash>+<key>".to_string(),
                ))
            }
        };

        let hash_bytes = hex::decode(hash_hex)
            .map_err(|e| Error::InvalidKey(format!("invalid key hash: {}", e)))?;
        if hash_hex.len() != 8 || hash_hex.to_ascii_lowercase() != hash_hex {
            return Err(Error::InvalidKey(format!(
                "key hash must be 8 lowercase hex digits: {}",
                hash_hex
            )));
        }

        let raw = decode_base64_canonical(encoded)
            .map_err(|e| Error::InvalidKey(format!("invalid key encoding: {}", e)))?;
        let (alg, key) = raw
            .split_first()
            .ok_or_else(|| Error::InvalidKey("empty key".to_string()))?;
        let algorithm = KeyAlgorithm::from_byte(*alg)?;
        let public_key: [u8; PUBLIC_KEY_SIZE] = key.try_into().map_err(|_| {
            Error::InvalidKey(format!(
                "Ed25519 public key must be {} bytes, got {}",
                PUBLIC_KEY_SIZE,
                key.len()
            ))
        })?;

        let verifier = Self::new(name, algorithm, public_key)?;
        if verifier.key_hash[..] != hash_bytes[..] {
            return Err(Error::InvalidKey(format!(
                "key hash {} does not match key (expected {})",
                hash_hex,
                hex::encode(verifier.key_hash)
            )));
        }
        Ok(verifier)
    }

    /// Encode as verifier key text
    pub fn to_text(&self) -> String {
        let mut raw = Vec::with_capacity(1 + PUBLIC_KEY_SIZE);
        raw.push(self.algorithm.as_byte());
        raw.extend_from_slice(&self.public_key);
        format!(
            "{}+{}+{}",
            self.name,
            hex::encode(self.key_hash),
            STANDARD.encode(raw)
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_hash(&self) -> [u8; 4] {
        self.key_hash
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_key
    }

    /// Whether a signature line claims to come from this key
    pub fn matches(&self, signature: &NoteSignature) -> bool {
        signature.name == self.name && signature.key_hash == self.key_hash
    }

    /// Verify one signature line against the checkpoint body.
    ///
    /// A line whose name or key hash differs from this key fails with
    /// [`Error::UnknownSigner`] without any cryptographic work. Otherwise a
    /// bad signature fails with [`Error::SignatureVerification`].
    pub fn verify_signature(&self, checkpoint: &Checkpoint, signature: &NoteSignature) -> Result<()> {
        if !self.matches(signature) {
            return Err(Error::UnknownSigner(format!(
                "signature by {}+{} does not match key {}+{}",
                signature.name,
                hex::encode(signature.key_hash),
                self.name,
                hex::encode(self.key_hash)
            )));
        }

        let body = checkpoint.to_body();
        let (message, sig) = match self.algorithm {
            KeyAlgorithm::Ed25519 => (body.into_bytes(), signature.signature.as_slice()),
            KeyAlgorithm::CosignatureV1 => {
                if signature.signature.len() != TIMESTAMP_SIZE + ED25519_SIGNATURE_SIZE {
                    return Err(Error::SignatureVerification(format!(
                        "cosignature from {} has length {}, expected {}",
                        self.name,
                        signature.signature.len(),
                        TIMESTAMP_SIZE + ED25519_SIGNATURE_SIZE
                    )));
                }
                let (timestamp, sig) = signature.signature.split_at(TIMESTAMP_SIZE);
                let mut ts = [0u8; TIMESTAMP_SIZE];
                ts.copy_from_slice(timestamp);
                (
                    cosignature_message(u64::from_be_bytes(ts), &body).into_bytes(),
                    sig,
                )
            }
        };

        UnparsedPublicKey::new(&ED25519, &self.public_key)
            .verify(&message, sig)
            .map_err(|_| {
                Error::SignatureVerification(format!("signature by {} is invalid", self.name))
            })
    }
}

/// The message a witness signs for a checkpoint body at `timestamp`
pub(crate) fn cosignature_message(timestamp: u64, body: &str) -> String {
    format!("{}\ntime {}\n{}", COSIGNATURE_HEADER, timestamp, body)
}

impl fmt::Display for NoteVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for NoteVerifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const LOG_VKEY: &str = "example.com/log+58490f8b+ARl/ayPhbIUyxqvIOPrNXqeJvgx2spIDNAOb+os9No1h";
    const WITNESS_VKEY: &str =
        "witness.example+d831bcf1+BOpKbGPinFIKvvVQexMuxfmVR3auvr57kkIe6mkURtIs";

    #[test]
    fn test_parse_log_key() {
        let verifier = NoteVerifier::parse(LOG_VKEY).unwrap();
        assert_eq!(verifier.name(), "example.com/log");
        assert_eq!(verifier.key_hash(), [0x58, 0x49, 0x0f, 0x8b]);
        assert_eq!(verifier.algorithm(), KeyAlgorithm::Ed25519);
        assert_eq!(verifier.to_text(), LOG_VKEY);
    }

    #[test]
    fn test_parse_cosignature_key() {
        let verifier: NoteVerifier = WITNESS_VKEY.parse().unwrap();
        assert_eq!(verifier.algorithm(), KeyAlgorithm::CosignatureV1);
        assert_eq!(verifier.to_string(), WITNESS_VKEY);
    }

    #[test]
    fn test_parse_tolerates_trailing_newline() {
        let verifier = NoteVerifier::parse(&format!("{}\n", LOG_VKEY)).unwrap();
        assert_eq!(verifier.to_text(), LOG_VKEY);
    }

    #[test]
    fn test_key_hash_known_values() {
        for text in [
            "fake.log.origin/log+527eabb8+AddT9PtBhhNAsDYZ0V0euiRbXuvrLsw4L6vKARfipnmz",
            "test-witness+26349ef0+BIQDFTUlktisMqJzWn8qhteWrRr4dLcQ9R37T+8LQyQF",
        ] {
            assert_eq!(NoteVerifier::parse(text).unwrap().to_text(), text);
        }
    }

    #[rstest]
    #[case::missing_parts("example.com/log+58490f8b")]
    #[case::wrong_hash("example.com/log+58490f8c+ARl/ayPhbIUyxqvIOPrNXqeJvgx2spIDNAOb+os9No1h")]
    #[case::upper_hex("example.com/log+58490F8B+ARl/ayPhbIUyxqvIOPrNXqeJvgx2spIDNAOb+os9No1h")]
    #[case::renamed("other.example/log+58490f8b+ARl/ayPhbIUyxqvIOPrNXqeJvgx2spIDNAOb+os9No1h")]
    #[case::bad_algorithm("example.com/log+58490f8b+Ahl/ayPhbIUyxqvIOPrNXqeJvgx2spIDNAOb+os9No1h")]
    #[case::short_key("example.com/log+58490f8b+ARl/ayPh")]
    #[case::empty_name("+58490f8b+ARl/ayPhbIUyxqvIOPrNXqeJvgx2spIDNAOb+os9No1h")]
    fn test_parse_rejects(#[case] text: &str) {
        assert!(matches!(NoteVerifier::parse(text), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_unknown_signer_skips_crypto() {
        let verifier = NoteVerifier::parse(LOG_VKEY).unwrap();
        let checkpoint = Checkpoint::new("example.com/log", 1, Default::default());
        let signature = NoteSignature {
            name: "example.com/log".to_string(),
            key_hash: [0, 0, 0, 0],
            signature: vec![0; 64],
        };
        assert!(!verifier.matches(&signature));
        assert!(matches!(
            verifier.verify_signature(&checkpoint, &signature),
            Err(Error::UnknownSigner(_))
        ));
    }

    #[test]
    fn test_cosignature_message() {
        assert_eq!(
            cosignature_message(1700000000, "log\n1\nroot\n"),
            "cosignature/v1\ntime 1700000000\nlog\n1\nroot\n"
        );
    }
}
