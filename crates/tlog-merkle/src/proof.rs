//! Merkle inclusion proof verification
//!
//! Implements the RFC 9162 section 2.1.3.2 algorithm. The audit path is
//! consumed from the leaf up; its length is fully determined by the leaf
//! index and the tree size, and any other length is rejected before hashing.

use crate::error::{Error, Result};
use crate::tree::{bit_length, hash_children};
use tlog_types::Sha256Hash;

/// Number of hashes on the audit path of leaf `index` in a tree of `size` leaves.
///
/// The path has one entry per level below the point where the leaf's path
/// diverges from the tree's right edge, plus one per left sibling on the
/// border above it.
pub fn audit_path_length(index: u64, size: u64) -> usize {
    if size == 0 || index >= size {
        return 0;
    }
    let inner = bit_length(index ^ (size - 1));
    let border = (index >> inner).count_ones();
    (inner + border) as usize
}

/// Recompute the root hash implied by an audit path.
///
/// Fails with [`Error::InvalidTreeSize`] on an empty tree,
/// [`Error::InvalidLeafIndex`] when `index >= size`, and
/// [`Error::MalformedProof`] when the path has the wrong length.
pub fn root_from_audit_path(
    leaf_hash: &Sha256Hash,
    index: u64,
    size: u64,
    path: &[Sha256Hash],
) -> Result<Sha256Hash> {
    if size == 0 {
        return Err(Error::InvalidTreeSize(
            "tree size cannot be zero".to_string(),
        ));
    }
    if index >= size {
        return Err(Error::InvalidLeafIndex(format!(
            "leaf index {} >= tree size {}",
            index, size
        )));
    }

    let expected = audit_path_length(index, size);
    if path.len() != expected {
        return Err(Error::MalformedProof(format!(
            "expected {} proof hashes for leaf {} in tree of size {}, got {}",
            expected,
            index,
            size,
            path.len()
        )));
    }

    let mut fn_ = index;
    let mut sn = size - 1;
    let mut hash = *leaf_hash;

    for sibling in path {
        if sn == 0 {
            return Err(Error::MalformedProof(
                "audit path continues past the root".to_string(),
            ));
        }
        if fn_ & 1 == 1 || fn_ == sn {
            hash = hash_children(sibling, &hash);
            // Skip levels where this node is promoted without a sibling
            while fn_ & 1 == 0 && fn_ != 0 {
                fn_ >>= 1;
                sn >>= 1;
            }
        } else {
            hash = hash_children(&hash, sibling);
        }
        fn_ >>= 1;
        sn >>= 1;
    }

    if sn != 0 {
        return Err(Error::MalformedProof(
            "audit path ended below the root".to_string(),
        ));
    }

    Ok(hash)
}

/// Verify that `leaf_hash` sits at `index` in the tree with root `expected_root`.
pub fn verify_inclusion_proof(
    leaf_hash: &Sha256Hash,
    index: u64,
    size: u64,
    path: &[Sha256Hash],
    expected_root: &Sha256Hash,
) -> Result<()> {
    let actual = root_from_audit_path(leaf_hash, index, size, path)?;
    if &actual != expected_root {
        return Err(Error::RootMismatch {
            expected: expected_root.to_hex(),
            actual: actual.to_hex(),
        });
    }
    Ok(())
}
