//! Tree-shape math over explicit leaf ranges
//!
//! RFC 6962 defines the tree recursively: a range of `n > 1` leaves splits at
//! the largest power of two strictly less than `n`. The functions here walk
//! that recursion iteratively with explicit `[begin, end)` state so that the
//! proof builder and the verifier agree on the exact same shape.

use crate::error::{Error, Result};

/// Largest power of two strictly less than `n`. Requires `n >= 2`.
pub fn split_point(n: u64) -> u64 {
    debug_assert!(n >= 2, "split_point requires at least two leaves");
    1 << (63 - (n - 1).leading_zeros())
}

/// A perfect, aligned subtree: `2^level` leaves starting at `index << level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subtree {
    /// Height above the leaves (0 is a single leaf)
    pub level: u32,
    /// Index of the node among the nodes at this level
    pub index: u64,
}

impl Subtree {
    /// First leaf covered by this subtree
    pub fn begin(&self) -> u64 {
        self.index << self.level
    }

    /// One past the last leaf covered by this subtree
    pub fn end(&self) -> u64 {
        (self.index + 1) << self.level
    }
}

/// A contiguous leaf range `[begin, end)` whose hash is one audit path entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRange {
    pub begin: u64,
    pub end: u64,
}

impl NodeRange {
    /// Number of leaves in the range
    pub fn len(&self) -> u64 {
        self.end - self.begin
    }

    /// Whether the range covers no leaves
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// The perfect subtrees making up this range, left to right
    pub fn subtrees(&self) -> Vec<Subtree> {
        decompose(self.begin, self.end)
    }
}

/// Split `[begin, end)` into maximal perfect aligned subtrees, left to right.
///
/// For the ranges that appear on an RFC 6962 audit path the subtree sizes
/// are strictly decreasing, and folding their hashes from the right yields
/// the hash of the whole range.
pub fn decompose(mut begin: u64, end: u64) -> Vec<Subtree> {
    let mut subtrees = Vec::new();
    while begin < end {
        let by_alignment = if begin == 0 { 63 } else { begin.trailing_zeros() };
        let by_length = 63 - (end - begin).leading_zeros();
        let level = by_alignment.min(by_length);
        subtrees.push(Subtree {
            level,
            index: begin >> level,
        });
        begin += 1 << level;
    }
    subtrees
}

/// Sibling ranges on the audit path of leaf `index` in a tree of `size` leaves.
///
/// The result is ordered from the leaf up to the root, matching the order
/// in which proof hashes are consumed during verification.
pub fn inclusion_path(index: u64, size: u64) -> Result<Vec<NodeRange>> {
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

    let (mut begin, mut end) = (0u64, size);
    let mut path = Vec::new();
    while end - begin > 1 {
        let mid = begin + split_point(end - begin);
        if index < mid {
            path.push(NodeRange { begin: mid, end });
            end = mid;
        } else {
            path.push(NodeRange { begin, end: mid });
            begin = mid;
        }
    }
    path.reverse();
    Ok(path)
}
