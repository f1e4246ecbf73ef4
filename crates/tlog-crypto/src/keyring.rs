//! Key lookup by signer name and key hash
//!
//! Signature lines identify their key by name plus a 4-byte key hash. A
//! keyring resolves that pair to a verifier so notes can be checked against
//! any number of known keys.

use crate::error::{Error, Result};
use crate::note::NoteVerifier;
use std::collections::HashMap;
use tlog_types::{Checkpoint, NoteSignature};

/// Resolves a signature line to the key that should verify it
pub trait KeyLookup {
    /// Find the verifier for a signer name and key hash
    fn lookup(&self, name: &str, key_hash: &[u8; 4]) -> Option<&NoteVerifier>;

    /// Verify a signature line with the key it names.
    ///
    /// Returns the verifier that accepted the signature.
    fn verify(&self, checkpoint: &Checkpoint, signature: &NoteSignature) -> Result<&NoteVerifier> {
        let verifier = self
            .lookup(&signature.name, &signature.key_hash)
            .ok_or_else(|| {
                Error::UnknownSigner(format!(
                    "no key for {}+{}",
                    signature.name,
                    hex::encode(signature.key_hash)
                ))
            })?;
        verifier.verify_signature(checkpoint, signature)?;
        Ok(verifier)
    }
}

impl KeyLookup for NoteVerifier {
    fn lookup(&self, name: &str, key_hash: &[u8; 4]) -> Option<&NoteVerifier> {
        (self.name() == name && &self.key_hash() == key_hash).then_some(self)
    }
}

impl<T: KeyLookup + ?Sized> KeyLookup for &T {
    fn lookup(&self, name: &str, key_hash: &[u8; 4]) -> Option<&NoteVerifier> {
        (**self).lookup(name, key_hash)
    }
}

/// A set of verifier keys indexed by `(name, key hash)`
#[derive(Debug, Clone, Default)]
pub struct Keyring {
    keys: HashMap<(String, [u8; 4]), NoteVerifier>,
}

impl Keyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, returning the key it replaced if any
    pub fn add(&mut self, verifier: NoteVerifier) -> Option<NoteVerifier> {
        let id = (verifier.name().to_string(), verifier.key_hash());
        self.keys.insert(id, verifier)
    }

    pub fn get(&self, name: &str, key_hash: &[u8; 4]) -> Option<&NoteVerifier> {
        self.keys.get(&(name.to_string(), *key_hash))
    }

    /// Whether any key is registered under this name
    pub fn contains_name(&self, name: &str) -> bool {
        self.keys.keys().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteVerifier> {
        self.keys.values()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyLookup for Keyring {
    fn lookup(&self, name: &str, key_hash: &[u8; 4]) -> Option<&NoteVerifier> {
        self.get(name, key_hash)
    }
}

impl FromIterator<NoteVerifier> for Keyring {
    fn from_iter<I: IntoIterator<Item = NoteVerifier>>(iter: I) -> Self {
        let mut keyring = Keyring::new();
        for verifier in iter {
            keyring.add(verifier);
        }
        keyring
    }
}
