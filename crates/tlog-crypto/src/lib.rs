//! Cryptographic primitives for transparency log checkpoints
//!
//! This crate provides signed note keys, checkpoint signing and verification,
//! and witness cosignatures using aws-lc-rs as the cryptographic backend.

pub mod checkpoint;
pub mod error;
pub mod hash;
pub mod keyring;
pub mod note;
pub mod signing;

pub use checkpoint::{cosign_checkpoint, sign_checkpoint, verify_checkpoint};
pub use error::{Error, Result};
pub use hash::Sha256Hasher;
pub use keyring::{KeyLookup, Keyring};
pub use note::{key_hash, KeyAlgorithm, NoteVerifier, COSIGNATURE_HEADER};
pub use signing::NoteSigner;
