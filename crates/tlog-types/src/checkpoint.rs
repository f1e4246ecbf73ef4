//! Checkpoint (signed tree head) types
//!
//! A checkpoint commits to the state of a transparency log. It is carried as a
//! C2SP signed note: a text body followed by a blank line and one or more
//! signature lines.
//!
//! Format specified in: https://c2sp.org/tlog-checkpoint and https://c2sp.org/signed-note
//!
//! ```text
//! <origin>
//! <tree_size>
//! <root_hash_base64>
//! [extension lines...]
//!
//! — <signer_name> <base64(key_hash || signature)>
//! [additional signatures...]
//! ```
//!
//! Signatures cover the body bytes verbatim, so parsing is strict: any input
//! accepted by [`SignedCheckpoint::parse`] serializes back to the identical
//! bytes with [`SignedCheckpoint::to_bytes`].

use crate::encoding::{decode_base64_canonical, Sha256Hash};
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Prefix of every signature line: an em dash (U+2014) followed by a space.
pub const SIGNATURE_PREFIX: &str = "\u{2014} ";

/// The signed body of a checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// The origin string identifying the log
    pub origin: String,
    /// Tree size (number of leaves)
    pub tree_size: u64,
    /// Root hash of the Merkle tree
    pub root_hash: Sha256Hash,
    /// Opaque extension lines following the root hash
    pub extension: Vec<String>,
}

/// A signature line on a checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSignature {
    /// Name of the signer, as it appears after the em dash
    pub name: String,
    /// First four bytes of the signer's key hash
    pub key_hash: [u8; 4],
    /// Signature bytes following the key hash
    pub signature: Vec<u8>,
}

/// A checkpoint together with its signature lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCheckpoint {
    /// The signed body
    pub checkpoint: Checkpoint,
    /// Signatures in the order they appear in the note
    pub signatures: Vec<NoteSignature>,
}

impl Checkpoint {
    /// Create a checkpoint without extension lines
    pub fn new(origin: impl Into<String>, tree_size: u64, root_hash: Sha256Hash) -> Self {
        Self {
            origin: origin.into(),
            tree_size,
            root_hash,
            extension: Vec::new(),
        }
    }

    /// Append extension lines to the body
    pub fn with_extension(mut self, lines: impl IntoIterator<Item = String>) -> Self {
        self.extension.extend(lines);
        self
    }

    /// Parse a checkpoint body.
    ///
    /// The body must end with a newline. Every line is required to be
    /// non-empty, the tree size must be canonical decimal and the root hash
    /// canonical base64.
    pub fn from_body(body: &str) -> Result<Self> {
        let body = body
            .strip_suffix('\n')
            .ok_or_else(|| Error::InvalidCheckpoint("body must end with a newline".to_string()))?;

        let mut lines = body.split('\n');

        let origin = lines
            .next()
            .filter(|line| !line.is_empty())
            .ok_or_else(|| Error::InvalidCheckpoint("missing origin".to_string()))?;

        let size_line = lines
            .next()
            .ok_or_else(|| Error::InvalidCheckpoint("missing tree size".to_string()))?;
        let tree_size = parse_decimal(size_line)?;

        let root_line = lines
            .next()
            .ok_or_else(|| Error::InvalidCheckpoint("missing root hash".to_string()))?;
        let root_hash = Sha256Hash::from_base64(root_line)
            .map_err(|e| Error::InvalidCheckpoint(format!("invalid root hash: {}", e)))?;

        let mut extension = Vec::new();
        for line in lines {
            if line.is_empty() {
                return Err(Error::InvalidCheckpoint(
                    "unexpected empty line in checkpoint body".to_string(),
                ));
            }
            extension.push(line.to_string());
        }

        Ok(Checkpoint {
            origin: origin.to_string(),
            tree_size,
            root_hash,
            extension,
        })
    }

    /// Encode the checkpoint body. This is the exact message every signature covers.
    pub fn to_body(&self) -> String {
        let mut body = format!(
            "{}\n{}\n{}\n",
            self.origin,
            self.tree_size,
            self.root_hash.to_base64()
        );
        for line in &self.extension {
            body.push_str(line);
            body.push('\n');
        }
        body
    }
}

/// Parse a tree size, rejecting signs, whitespace and leading zeros.
fn parse_decimal(s: &str) -> Result<u64> {
    let canonical = !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'));
    if !canonical {
        return Err(Error::InvalidCheckpoint(format!("invalid tree size: {:?}", s)));
    }
    s.parse()
        .map_err(|_| Error::InvalidCheckpoint(format!("tree size out of range: {}", s)))
}

/// Signer names must be non-empty and contain neither whitespace nor '+'.
pub fn is_valid_signer_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c == '+')
}

impl NoteSignature {
    /// Parse a single signature line (without its trailing newline).
    pub fn from_line(line: &str) -> Result<Self> {
        let rest = line.strip_prefix(SIGNATURE_PREFIX).ok_or_else(|| {
            Error::InvalidCheckpoint("signature line must start with an em dash".to_string())
        })?;

        let (name, encoded) = rest.split_once(' ').ok_or_else(|| {
            Error::InvalidCheckpoint("signature line must have format: — <name> <signature>".to_string())
        })?;
        if !is_valid_signer_name(name) {
            return Err(Error::InvalidCheckpoint(format!("invalid signer name: {:?}", name)));
        }

        let decoded = decode_base64_canonical(encoded)
            .map_err(|e| Error::InvalidCheckpoint(format!("invalid signature encoding: {}", e)))?;
        if decoded.len() <= 4 {
            return Err(Error::InvalidCheckpoint(
                "signature too short for key hash and signature bytes".to_string(),
            ));
        }

        let mut key_hash = [0u8; 4];
        key_hash.copy_from_slice(&decoded[..4]);

        Ok(NoteSignature {
            name: name.to_string(),
            key_hash,
            signature: decoded[4..].to_vec(),
        })
    }

    /// Encode as a signature line, including the trailing newline.
    pub fn to_line(&self) -> String {
        let mut raw = Vec::with_capacity(4 + self.signature.len());
        raw.extend_from_slice(&self.key_hash);
        raw.extend_from_slice(&self.signature);
        format!("{}{} {}\n", SIGNATURE_PREFIX, self.name, STANDARD.encode(raw))
    }
}

impl SignedCheckpoint {
    /// Wrap an unsigned checkpoint; signatures are appended by signers.
    pub fn new(checkpoint: Checkpoint) -> Self {
        Self {
            checkpoint,
            signatures: Vec::new(),
        }
    }

    /// Parse a signed note from raw bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::InvalidCheckpoint(format!("note is not valid UTF-8: {}", e)))?;
        Self::from_text(text)
    }

    /// Parse a signed note from text.
    pub fn from_text(text: &str) -> Result<Self> {
        let split = text
            .find("\n\n")
            .ok_or_else(|| Error::InvalidCheckpoint("missing blank line separator".to_string()))?;
        let body = &text[..split + 1];
        let signature_block = &text[split + 2..];

        let checkpoint = Checkpoint::from_body(body)?;

        let signature_block = signature_block.strip_suffix('\n').ok_or_else(|| {
            Error::InvalidCheckpoint("signature block must end with a newline".to_string())
        })?;
        let signatures = signature_block
            .split('\n')
            .map(NoteSignature::from_line)
            .collect::<Result<Vec<_>>>()?;

        Ok(SignedCheckpoint {
            checkpoint,
            signatures,
        })
    }

    /// The bytes covered by every signature on this note.
    pub fn signed_body(&self) -> String {
        self.checkpoint.to_body()
    }

    /// Serialize the note as text.
    pub fn to_text(&self) -> String {
        let mut text = self.checkpoint.to_body();
        text.push('\n');
        for signature in &self.signatures {
            text.push_str(&signature.to_line());
        }
        text
    }

    /// Serialize the note to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_text().into_bytes()
    }

    /// Signatures claiming to come from the given signer name.
    pub fn signatures_by<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a NoteSignature> {
        self.signatures.iter().filter(move |sig| sig.name == name)
    }
}
