//! Hashing primitives for the payd SPV engine.
//!
//! - **SHA-256d** for transaction ids and block hashes
//! - Merkle branch folding for TSC branch proofs

pub mod hash;
pub mod merkle;

pub use hash::{hash_header, hash_transaction, sha256, sha256d, sha256d_multi};
pub use merkle::{branch_root, merkle_branch, merkle_parent, merkle_root, MerkleError, MerkleNode};
