//! RFC 6962 Merkle tree primitives for transparency-logged trust roots
//!
//! This crate implements the domain-separated hashing, the tree-shape math
//! shared by the proof builder and the verifier, and inclusion proof
//! verification.

pub mod error;
pub mod proof;
pub mod range;
pub mod tree;

pub use error::{Error, Result};
pub use proof::{audit_path_length, root_from_audit_path, verify_inclusion_proof};
pub use range::{decompose, inclusion_path, split_point, NodeRange, Subtree};
pub use tree::{
    combine_subtrees, hash_children, hash_leaf, tree_root, LEAF_HASH_PREFIX, NODE_HASH_PREFIX,
};
