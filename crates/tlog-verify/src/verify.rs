//! Verification of proofs embedded in trust documents

use tlog_crypto::{verify_checkpoint, NoteVerifier};
use tlog_merkle::{hash_leaf, verify_inclusion_proof};
use tlog_tuf::TrustDocument;
use tlog_types::{Sha256Hash, SignedCheckpoint, TLogProof};
use tlog_witness::WitnessPolicy;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::PROOF_FIELD;

/// Summary of a successfully verified document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedProof {
    /// Leaf index of the document in the log
    pub index: u64,
    /// Size of the tree the proof was built against
    pub tree_size: u64,
    /// Checkpoint root hash
    pub root_hash: Sha256Hash,
    /// Log origin line
    pub origin: String,
    /// Hash of the canonical document
    pub leaf_hash: Sha256Hash,
    /// Witnesses whose cosignatures verified, sorted by name
    pub witnesses: Vec<String>,
}

/// Verifies that trust documents are included in a log
#[derive(Debug, Clone)]
pub struct Verifier {
    log_key: NoteVerifier,
    witness_policy: Option<WitnessPolicy>,
}

impl Verifier {
    /// Verify checkpoints against the given log key
    pub fn new(log_key: NoteVerifier) -> Self {
        Self {
            log_key,
            witness_policy: None,
        }
    }

    /// Also require the checkpoint cosignatures to satisfy `policy`
    pub fn with_witness_policy(mut self, policy: WitnessPolicy) -> Self {
        self.witness_policy = Some(policy);
        self
    }

    /// Parse witness policy text and require its quorum
    ///
    /// Fails with [`Error::PolicyParse`] when the text is not a valid policy.
    pub fn with_witness_policy_text(self, text: &str) -> Result<Self> {
        let policy = WitnessPolicy::parse(text)?;
        Ok(self.with_witness_policy(policy))
    }

    pub fn log_key(&self) -> &NoteVerifier {
        &self.log_key
    }

    pub fn witness_policy(&self) -> Option<&WitnessPolicy> {
        self.witness_policy.as_ref()
    }

    /// Verify the proof embedded in `doc`
    ///
    /// Each gate must pass; the first failure rejects the document:
    ///
    /// 1. The document carries a proof, which is left out of the canonical
    ///    bytes that form the leaf.
    /// 2. The proof container decodes.
    /// 3. The checkpoint parses and carries a valid signature from the log
    ///    key, and its origin is the log key name.
    /// 4. If a witness policy is set, the cosignatures satisfy its quorum.
    /// 5. The audit path leads from the leaf to the checkpoint root.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tlog_crypto::NoteVerifier;
    /// use tlog_tuf::TrustDocument;
    /// use tlog_verify::Verifier;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let log_key = NoteVerifier::parse(&std::fs::read_to_string("log.vkey")?)?;
    /// let doc = TrustDocument::from_file("root.json")?;
    /// let verified = Verifier::new(log_key).verify(&doc)?;
    /// println!("version at index {} of {}", verified.index, verified.tree_size);
    /// # Ok(())
    /// # }
    /// ```
    pub fn verify(&self, doc: &TrustDocument) -> Result<VerifiedProof> {
        let encoded = doc.extension(PROOF_FIELD).ok_or(Error::ProofMissing)?;
        let encoded = encoded
            .as_str()
            .ok_or_else(|| Error::ProofDecode(format!("{} is not a string", PROOF_FIELD)))?;

        let canonical = doc.canonical_bytes_without(PROOF_FIELD)?;
        let leaf_hash = hash_leaf(&canonical);

        let proof =
            TLogProof::from_base64(encoded).map_err(|e| Error::ProofDecode(e.to_string()))?;

        let note = SignedCheckpoint::parse(&proof.checkpoint)
            .map_err(|e| Error::CheckpointParse(e.to_string()))?;
        verify_checkpoint(&note, &self.log_key)?;

        let witnesses = match &self.witness_policy {
            Some(policy) => {
                let verified = policy.verified_witnesses(&note, policy.keyring());
                let satisfied = policy
                    .quorum()
                    .map_or(true, |quorum| quorum.is_satisfied(&verified));
                if !satisfied {
                    warn!(
                        origin = %note.checkpoint.origin,
                        cosigned = verified.len(),
                        "witness quorum not met"
                    );
                    return Err(Error::WitnessQuorumNotMet);
                }
                let mut names: Vec<String> = verified.into_iter().map(str::to_string).collect();
                names.sort();
                names
            }
            None => Vec::new(),
        };

        let checkpoint = &note.checkpoint;
        verify_inclusion_proof(
            &leaf_hash,
            proof.index,
            checkpoint.tree_size,
            &proof.hashes,
            &checkpoint.root_hash,
        )
        .map_err(|e| Error::InclusionProofMismatch(e.to_string()))?;

        debug!(
            index = proof.index,
            tree_size = checkpoint.tree_size,
            "inclusion proof verified"
        );
        Ok(VerifiedProof {
            index: proof.index,
            tree_size: checkpoint.tree_size,
            root_hash: checkpoint.root_hash,
            origin: checkpoint.origin.clone(),
            leaf_hash,
            witnesses,
        })
    }
}

/// Verify the proof embedded in `doc` against a log key and an optional
/// witness policy
pub fn verify_document(
    doc: &TrustDocument,
    log_key: &NoteVerifier,
    witness_policy: Option<&WitnessPolicy>,
) -> Result<VerifiedProof> {
    let mut verifier = Verifier::new(log_key.clone());
    if let Some(policy) = witness_policy {
        verifier = verifier.with_witness_policy(policy.clone());
    }
    verifier.verify(doc)
}
