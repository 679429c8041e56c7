//! Nullable block: a fake mined block whose merkle proofs are real.

use payd_crypto::{merkle_branch, merkle_root};
use payd_transactions::Transaction;
use payd_types::{BlockHash, BlockHeader, MerkleProof, ProofType, TargetType, TxId, DUPLICATE_NODE};

/// A block built around a list of transactions.
///
/// The header commits to the real merkle root of the txids, so a proof from
/// [`NullBlock::proof`] verifies against [`NullBlock::header`].
#[derive(Clone, Debug)]
pub struct NullBlock {
    pub header: BlockHeader,
    pub tx_ids: Vec<TxId>,
}

impl NullBlock {
    /// "Mine" a block containing `txs` in order. `nonce` keeps otherwise
    /// identical blocks apart.
    ///
    /// # Panics
    ///
    /// Panics if `txs` is empty.
    pub fn mine(txs: &[Transaction], nonce: u32) -> Self {
        let tx_ids: Vec<TxId> = txs.iter().map(Transaction::tx_id).collect();
        Self::from_tx_ids(tx_ids, nonce)
    }

    pub fn from_tx_ids(tx_ids: Vec<TxId>, nonce: u32) -> Self {
        let leaves: Vec<[u8; 32]> = tx_ids.iter().map(|id| *id.as_bytes()).collect();
        let merkle_root = merkle_root(&leaves).expect("a block needs at least one tx");
        let header = BlockHeader {
            version: 1,
            prev_block: BlockHash::ZERO,
            merkle_root,
            time: 1_600_000_000,
            bits: 0x1d00ffff,
            nonce,
        };
        Self { header, tx_ids }
    }

    pub fn hash(&self) -> BlockHash {
        payd_crypto::hash_header(&self.header)
    }

    /// A branch proof for `id` targeting this block's hash, or `None` if
    /// the block does not contain it.
    pub fn proof(&self, id: &TxId) -> Option<MerkleProof> {
        self.proof_with_target(id, TargetType::Hash)
    }

    /// Same as [`NullBlock::proof`] with an explicit target kind.
    pub fn proof_with_target(&self, id: &TxId, target_type: TargetType) -> Option<MerkleProof> {
        let index = self.tx_ids.iter().position(|t| t == id)?;
        let leaves: Vec<[u8; 32]> = self.tx_ids.iter().map(|id| *id.as_bytes()).collect();
        let branch = merkle_branch(&leaves, index).ok()?;
        let nodes = branch
            .into_iter()
            .map(|node| match node {
                Some(mut hash) => {
                    hash.reverse();
                    hex::encode(&hash)
                }
                None => DUPLICATE_NODE.to_string(),
            })
            .collect();

        let target = match target_type {
            TargetType::Hash => self.hash().to_hex(),
            TargetType::Header => hex::encode(&self.header.to_bytes()),
            TargetType::MerkleRoot => {
                let mut root = self.header.merkle_root;
                root.reverse();
                hex::encode(&root)
            }
        };

        Some(MerkleProof {
            index: index as u64,
            tx_or_id: id.to_hex(),
            target,
            nodes,
            target_type,
            proof_type: ProofType::Branch,
            composite: false,
        })
    }
}
