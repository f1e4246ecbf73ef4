//! TUF metadata documents and their canonical form
//!
//! A trust document is TUF metadata: a `signed` object carrying the
//! `version`, a `signatures` array, and any number of top-level fields the
//! metadata schema does not know about. Transparency proofs travel in one of
//! those unrecognized fields, so the document keeps them in an explicit map
//! and can canonicalize itself with a field left out.
//!
//! Canonicalization follows OLPC canonical JSON: object keys sorted
//! bytewise, no insignificant whitespace, only `"` and `\` escaped, and
//! integers as the only numbers.
//!
//! # Example
//!
//! ```
//! use tlog_tuf::TrustDocument;
//!
//! let doc = TrustDocument::from_json(
//!     r#"{"signed": {"version": 3, "_type": "root"}, "signatures": [], "tlog_proof": "AAAA"}"#,
//! )
//! .unwrap();
//! assert_eq!(doc.version().unwrap(), 3);
//! assert_eq!(
//!     doc.canonical_bytes_without("tlog_proof").unwrap(),
//!     br#"{"signatures":[],"signed":{"_type":"root","version":3}}"#
//! );
//! ```

pub mod canonical;
pub mod document;
pub mod error;

pub use canonical::canonicalize;
pub use document::TrustDocument;
pub use error::{Error, Result};
