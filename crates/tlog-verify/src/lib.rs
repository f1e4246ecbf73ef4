//! Transparency log proofs for TUF trust roots
//!
//! Each version of a trust document is appended to a tiled transparency log,
//! version `N` at leaf `N - 1`. This crate embeds an inclusion proof for the
//! document into the document itself, as the unrecognized top-level field
//! `tlog_proof`, and verifies such proofs offline:
//!
//! - [`issue_proof`] reads the log through a [`tlog_tiles::TileFetcher`],
//!   builds the audit path and embeds the proof with the signed checkpoint.
//! - [`Verifier`] checks the log signature on the checkpoint, an optional
//!   witness quorum, and the audit path from the canonical document up to
//!   the checkpoint root.
//!
//! # Example
//!
//! ```no_run
//! use tlog_crypto::NoteVerifier;
//! use tlog_tiles::FileSystemTiles;
//! use tlog_tuf::TrustDocument;
//! use tlog_verify::{issue_proof, IssueOptions, Verifier};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let log_key = NoteVerifier::parse(&std::fs::read_to_string("log.vkey")?)?;
//! let doc = TrustDocument::from_file("root.json")?;
//!
//! let options = IssueOptions::default().with_log_key(log_key.clone());
//! let doc = issue_proof(&doc, &FileSystemTiles::new("log"), &options).await?;
//!
//! Verifier::new(log_key).verify(&doc)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
mod issue;
mod verify;

pub use error::{Error, Result};
pub use issue::{issue_proof, IssueOptions};
pub use verify::{verify_document, VerifiedProof, Verifier};

/// Top-level document field holding the encoded proof
pub const PROOF_FIELD: &str = "tlog_proof";
