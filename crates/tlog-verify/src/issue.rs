//! Embedding inclusion proofs into trust documents

use serde_json::Value;
use tlog_crypto::{verify_checkpoint, NoteVerifier};
use tlog_merkle::{hash_leaf, verify_inclusion_proof};
use tlog_tiles::{ProofBuilder, TileFetcher, DEFAULT_CONCURRENCY};
use tlog_tuf::TrustDocument;
use tlog_types::{SignedCheckpoint, TLogProof};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::PROOF_FIELD;

/// Options for issuing a proof
#[derive(Debug, Clone)]
pub struct IssueOptions {
    /// Tile fetches in flight at once
    pub concurrency: usize,
    /// When set, the log checkpoint must carry a valid signature from this key
    pub log_key: Option<NoteVerifier>,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            log_key: None,
        }
    }
}

impl IssueOptions {
    /// Limit the number of concurrent tile fetches
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Verify the log checkpoint before building the proof
    pub fn with_log_key(mut self, log_key: NoteVerifier) -> Self {
        self.log_key = Some(log_key);
        self
    }
}

/// Build an inclusion proof for `doc` and return the document with the proof
/// embedded.
///
/// The document is expected at leaf `version - 1` of the log, since the log
/// holds nothing but successive versions of the document. Any proof already
/// present is replaced.
///
/// The steps are:
///
/// 1. Canonicalize the document without its proof field and hash the leaf.
/// 2. Read and parse the latest checkpoint, checking its signature when a
///    log key is configured.
/// 3. Build the audit path from the log tiles.
/// 4. Check that the path leads from the leaf to the checkpoint root.
/// 5. Encode the proof container and embed it.
///
/// Nothing is embedded if any step fails.
pub async fn issue_proof<F: TileFetcher + ?Sized>(
    doc: &TrustDocument,
    fetcher: &F,
    options: &IssueOptions,
) -> Result<TrustDocument> {
    let canonical = doc.canonical_bytes_without(PROOF_FIELD)?;
    let leaf_hash = hash_leaf(&canonical);

    let version = doc.version()?;
    let index = version.checked_sub(1).ok_or_else(|| {
        Error::IndexOutOfRange("document version 0 has no log entry".to_string())
    })?;

    let checkpoint_bytes = fetcher.read_checkpoint().await?;
    let note = SignedCheckpoint::parse(&checkpoint_bytes)
        .map_err(|e| Error::CheckpointParse(e.to_string()))?;
    if let Some(log_key) = &options.log_key {
        verify_checkpoint(&note, log_key)?;
    }
    let size = note.checkpoint.tree_size;
    if index >= size {
        return Err(Error::IndexOutOfRange(format!(
            "leaf {} for version {} is not in a tree of size {}",
            index, version, size
        )));
    }
    debug!(index, size, origin = %note.checkpoint.origin, "building inclusion proof");

    let hashes = ProofBuilder::new(size, fetcher)
        .with_concurrency(options.concurrency)
        .inclusion_proof(index)
        .await?;

    verify_inclusion_proof(&leaf_hash, index, size, &hashes, &note.checkpoint.root_hash)?;

    let proof = TLogProof {
        index,
        hashes,
        checkpoint: checkpoint_bytes,
    };
    let encoded = proof
        .to_base64()
        .map_err(|e| Error::MalformedProof(e.to_string()))?;

    let mut issued = doc.clone();
    issued.insert_extension(PROOF_FIELD, Value::String(encoded))?;
    info!(index, size, "embedded inclusion proof");
    Ok(issued)
}
