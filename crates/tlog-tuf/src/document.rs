//! TUF metadata with unrecognized top-level fields preserved

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tracing::trace;

use crate::canonical::canonicalize;
use crate::error::{Error, Result};

const SIGNED: &str = "signed";
const SIGNATURES: &str = "signatures";

/// A TUF metadata document
///
/// Only the envelope is typed. The `signed` payload is kept as a JSON object
/// so that canonicalization covers exactly what was read, and top-level
/// fields other than `signed` and `signatures` land in [`extensions`].
///
/// [`extensions`]: TrustDocument::extensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustDocument {
    /// The signed metadata payload
    pub signed: Map<String, Value>,
    /// Signatures over the canonical `signed` payload
    pub signatures: Vec<Value>,
    /// Unrecognized top-level fields
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl TrustDocument {
    /// Parse a document from JSON bytes
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a document from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        trace!(path = %path.display(), "reading trust document");
        Self::from_slice(&std::fs::read(path)?)
    }

    /// Write the pretty-printed document to a file, replacing it
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_pretty_json()?)?;
        Ok(())
    }

    /// The metadata version from `signed.version`
    pub fn version(&self) -> Result<u64> {
        let version = self
            .signed
            .get("version")
            .ok_or_else(|| Error::MissingField("signed.version".to_string()))?;
        version
            .as_u64()
            .or_else(|| {
                // Integral floats count as integers, as in the canonical form
                version
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .ok_or_else(|| Error::InvalidVersion(version.to_string()))
    }

    /// An unrecognized top-level field
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Set an unrecognized top-level field, returning the previous value.
    ///
    /// `signed` and `signatures` are part of the envelope and cannot be set
    /// this way.
    pub fn insert_extension(&mut self, name: impl Into<String>, value: Value) -> Result<Option<Value>> {
        let name = name.into();
        if name == SIGNED || name == SIGNATURES {
            return Err(Error::ReservedField(name));
        }
        Ok(self.extensions.insert(name, value))
    }

    /// Remove exactly one unrecognized top-level field, returning its value
    pub fn remove_extension(&mut self, name: &str) -> Option<Value> {
        self.extensions.remove(name)
    }

    /// The whole document as a JSON value
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Canonical JSON of the whole document
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        canonicalize(&self.to_value()?)
    }

    /// Canonical JSON of the document with one unrecognized field left out.
    ///
    /// The document itself is not modified. Leaving out a field that is not
    /// present yields the same bytes as [`canonical_bytes`].
    ///
    /// [`canonical_bytes`]: TrustDocument::canonical_bytes
    pub fn canonical_bytes_without(&self, name: &str) -> Result<Vec<u8>> {
        let mut stripped = self.clone();
        stripped.remove_extension(name);
        stripped.canonical_bytes()
    }

    /// Pretty-printed JSON indented with tabs
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
        self.serialize(&mut ser)?;
        // serde_json only emits valid UTF-8
        String::from_utf8(buf).map_err(|e| Error::Encoding(e.to_string()))
    }
}

impl std::str::FromStr for TrustDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(s)
    }
}
