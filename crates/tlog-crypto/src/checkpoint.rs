//! Checkpoint signing and the log signature gate
//!
//! The note codec lives in `tlog-types`; this module ties parsed notes to
//! keys. A checkpoint is only trusted once it carries a valid signature from
//! the configured log key and its origin line names that same key.

use crate::error::{Error, Result};
use crate::note::NoteVerifier;
use crate::signing::NoteSigner;
use tlog_types::{Checkpoint, SignedCheckpoint};
use tracing::debug;

/// Verify the log's own signature on a checkpoint.
///
/// Fails with [`Error::UnknownSigner`] when no signature line carries the
/// log key's name and key hash, [`Error::SignatureVerification`] when none of
/// the matching lines verify, and [`Error::OriginMismatch`] when the
/// checkpoint origin differs from the key name.
pub fn verify_checkpoint(note: &SignedCheckpoint, log_key: &NoteVerifier) -> Result<()> {
    let mut candidates = note.signatures.iter().filter(|sig| log_key.matches(sig));
    let first = candidates.next().ok_or_else(|| {
        Error::UnknownSigner(format!(
            "checkpoint has no signature from log key {}",
            log_key.name()
        ))
    })?;

    let mut result = log_key.verify_signature(&note.checkpoint, first);
    for sig in candidates {
        if result.is_ok() {
            break;
        }
        result = log_key.verify_signature(&note.checkpoint, sig);
    }
    result?;

    if note.checkpoint.origin != log_key.name() {
        return Err(Error::OriginMismatch {
            expected: log_key.name().to_string(),
            actual: note.checkpoint.origin.clone(),
        });
    }

    debug!(
        origin = %note.checkpoint.origin,
        tree_size = note.checkpoint.tree_size,
        "checkpoint signature verified"
    );
    Ok(())
}

/// Produce a signed note carrying a single log signature
pub fn sign_checkpoint(checkpoint: Checkpoint, signer: &NoteSigner) -> Result<SignedCheckpoint> {
    let signature = signer.sign(&checkpoint)?;
    let mut note = SignedCheckpoint::new(checkpoint);
    note.signatures.push(signature);
    Ok(note)
}

/// Append a witness cosignature, stamped with the current time
pub fn cosign_checkpoint(note: &mut SignedCheckpoint, witness: &NoteSigner) -> Result<()> {
    let signature = witness.sign(&note.checkpoint)?;
    note.signatures.push(signature);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::KeyAlgorithm;
    use tlog_types::{NoteSignature, Sha256Hash};

    fn log_signer() -> NoteSigner {
        NoteSigner::from_seed("example.com/log", KeyAlgorithm::Ed25519, [42; 32]).unwrap()
    }

    fn signed() -> SignedCheckpoint {
        let checkpoint = Checkpoint::new("example.com/log", 7, Sha256Hash::from_bytes([9; 32]));
        sign_checkpoint(checkpoint, &log_signer()).unwrap()
    }

    #[test]
    fn test_verify_roundtrip_through_text() {
        let note = signed();
        let reparsed = SignedCheckpoint::parse(&note.to_bytes()).unwrap();
        verify_checkpoint(&reparsed, &log_signer().verifier().unwrap()).unwrap();
    }

    #[test]
    fn test_deterministic_signature_bytes() {
        // Ed25519 signatures are deterministic for a given key and message
        assert_eq!(signed().to_bytes(), signed().to_bytes());
    }

    #[test]
    fn test_missing_log_signature() {
        let other = NoteSigner::from_seed("other.example/log", KeyAlgorithm::Ed25519, [1; 32])
            .unwrap()
            .verifier()
            .unwrap();
        assert!(matches!(
            verify_checkpoint(&signed(), &other),
            Err(Error::UnknownSigner(_))
        ));
    }

    #[test]
    fn test_tampered_body() {
        let mut note = signed();
        note.checkpoint.tree_size = 8;
        assert!(matches!(
            verify_checkpoint(&note, &log_signer().verifier().unwrap()),
            Err(Error::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_later_valid_signature_is_accepted() {
        let mut note = signed();
        let valid = note.signatures[0].clone();
        note.signatures[0] = NoteSignature {
            signature: vec![0; 64],
            ..valid.clone()
        };
        note.signatures.push(valid);
        verify_checkpoint(&note, &log_signer().verifier().unwrap()).unwrap();
    }

    #[test]
    fn test_origin_must_match_key_name() {
        let checkpoint = Checkpoint::new("mirror.example/log", 7, Sha256Hash::from_bytes([9; 32]));
        let note = sign_checkpoint(checkpoint, &log_signer()).unwrap();
        assert!(matches!(
            verify_checkpoint(&note, &log_signer().verifier().unwrap()),
            Err(Error::OriginMismatch { .. })
        ));
    }

    #[test]
    fn test_cosign_appends_signature() {
        let witness =
            NoteSigner::from_seed("witness.example", KeyAlgorithm::CosignatureV1, [7; 32]).unwrap();
        let mut note = signed();
        cosign_checkpoint(&mut note, &witness).unwrap();
        assert_eq!(note.signatures.len(), 2);
        assert_eq!(note.signatures[1].signature.len(), 72);
        witness
            .verifier()
            .unwrap()
            .verify_signature(&note.checkpoint, &note.signatures[1])
            .unwrap();
    }
}
