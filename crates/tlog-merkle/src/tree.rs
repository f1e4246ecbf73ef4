//! Merkle tree hashing utilities
//!
//! Implements RFC 6962 compliant Merkle tree hashing with:
//! - Domain separation via prefixes (0x00 for leaf, 0x01 for node)
//! - SHA-256 hash function

use crate::range::split_point;
use sha2::{Digest, Sha256};
use tlog_types::Sha256Hash;

/// Prefix for leaf nodes in RFC 6962 Merkle tree
pub const LEAF_HASH_PREFIX: u8 = 0x00;

/// Prefix for internal nodes in RFC 6962 Merkle tree
pub const NODE_HASH_PREFIX: u8 = 0x01;

/// Hash a leaf node
///
/// Returns: SHA256(0x00 || leaf_data)
pub fn hash_leaf(data: &[u8]) -> Sha256Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_HASH_PREFIX]);
    hasher.update(data);
    Sha256Hash::from_bytes(hasher.finalize().into())
}

/// Hash two child nodes to create a parent node
///
/// Returns: SHA256(0x01 || left || right)
pub fn hash_children(left: &Sha256Hash, right: &Sha256Hash) -> Sha256Hash {
    let mut hasher = Sha256::new();
    hasher.update([NODE_HASH_PREFIX]);
    hasher.update(left.as_slice());
    hasher.update(right.as_slice());
    Sha256Hash::from_bytes(hasher.finalize().into())
}

/// Root hash of a tree over the given leaf hashes.
///
/// The empty tree hashes to SHA256 of the empty string.
pub fn tree_root(leaves: &[Sha256Hash]) -> Sha256Hash {
    match leaves.len() {
        0 => Sha256Hash::from_bytes(Sha256::digest(b"").into()),
        1 => leaves[0],
        n => {
            let k = split_point(n as u64) as usize;
            hash_children(&tree_root(&leaves[..k]), &tree_root(&leaves[k..]))
        }
    }
}

/// Combine the hashes of consecutive perfect subtrees into the hash of the
/// range they cover.
///
/// Subtrees must be ordered left to right with non-increasing sizes, as
/// produced by [`crate::range::decompose`] for a range that starts on a
/// sufficiently aligned boundary. The fold runs from the right, since
/// RFC 6962 attaches the smaller trailing subtrees first.
pub fn combine_subtrees(hashes: &[Sha256Hash]) -> Option<Sha256Hash> {
    let (last, rest) = hashes.split_last()?;
    Some(
        rest.iter()
            .rev()
            .fold(*last, |acc, left| hash_children(left, &acc)),
    )
}

/// Calculate the position of the most significant bit
pub fn bit_length(n: u64) -> u32 {
    64 - n.leading_zeros()
}
