//! Core types for transparency-logged trust roots
//!
//! This crate provides the value types shared by the proof builder and the
//! verifier: SHA-256 hashes, the C2SP signed-note checkpoint codec and the
//! binary proof container that is embedded into a trust document.

pub mod checkpoint;
pub mod encoding;
pub mod error;
pub mod proof;

pub use checkpoint::{
    is_valid_signer_name, Checkpoint, NoteSignature, SignedCheckpoint, SIGNATURE_PREFIX,
};
pub use encoding::{decode_base64_canonical, Sha256Hash, HASH_SIZE};
pub use error::{Error, Result};
pub use proof::{TLogProof, MAX_PROOF_HASHES};
