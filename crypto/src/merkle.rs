//! Merkle tree helpers for TSC branch proofs.
//!
//! All hashes here are in internal byte order. A branch node of `None`
//! stands for the `*` duplicate marker: the sibling equals the running hash,
//! which only happens for the last node of an odd-length level.

use thiserror::Error;

use crate::hash::sha256d_multi;

/// One node of a merkle branch; `None` duplicates the running hash.
pub type MerkleNode = Option<[u8; 32]>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("duplicate node at depth {depth} sits on the left of the running hash")]
    DuplicateOnLeft { depth: usize },

    #[error("index {index} does not fit a branch of {depth} nodes")]
    IndexOutOfRange { index: u64, depth: usize },

    #[error("cannot build a merkle tree without leaves")]
    NoLeaves,

    #[error("leaf {index} is outside a tree of {leaves} leaves")]
    LeafOutOfRange { index: usize, leaves: usize },
}

/// Hash two children into their parent: SHA-256d(left || right).
pub fn merkle_parent(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    sha256d_multi(&[left, right])
}

/// Fold a branch from `leaf` up to the root it commits to.
///
/// Bit `n` of `index` tells whether the running hash is the right (1) or
/// left (0) child at depth `n`. Bits left over once the branch is consumed
/// mean the branch is too short for the index.
pub fn branch_root(leaf: [u8; 32], index: u64, nodes: &[MerkleNode]) -> Result<[u8; 32], MerkleError> {
    let mut hash = leaf;
    let mut position = index;

    for (depth, node) in nodes.iter().enumerate() {
        let is_right = position & 1 == 1;
        let sibling = match node {
            Some(sibling) => *sibling,
            None if is_right => return Err(MerkleError::DuplicateOnLeft { depth }),
            None => hash,
        };
        hash = if is_right {
            merkle_parent(&sibling, &hash)
        } else {
            merkle_parent(&hash, &sibling)
        };
        position >>= 1;
    }

    if position != 0 {
        return Err(MerkleError::IndexOutOfRange {
            index,
            depth: nodes.len(),
        });
    }
    Ok(hash)
}

/// Merkle root of a full list of leaves (Bitcoin rules: odd levels duplicate the last hash).
pub fn merkle_root(leaves: &[[u8; 32]]) -> Result<[u8; 32], MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::NoLeaves);
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    Ok(level[0])
}

/// The branch proving `leaves[index]`, ready for [`branch_root`].
pub fn merkle_branch(leaves: &[[u8; 32]], index: usize) -> Result<Vec<MerkleNode>, MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::NoLeaves);
    }
    if index >= leaves.len() {
        return Err(MerkleError::LeafOutOfRange {
            index,
            leaves: leaves.len(),
        });
    }

    let mut branch = Vec::new();
    let mut level = leaves.to_vec();
    let mut position = index;
    while level.len() > 1 {
        let sibling = position ^ 1;
        if sibling < level.len() {
            branch.push(Some(level[sibling]));
        } else {
            branch.push(None);
        }
        level = next_level(&level);
        position >>= 1;
    }
    Ok(branch)
}

fn next_level(level: &[[u8; 32]]) -> Vec<[u8; 32]> {
    level
        .chunks(2)
        .map(|pair| {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            merkle_parent(left, right)
        })
        .collect()
}
