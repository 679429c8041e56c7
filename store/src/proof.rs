//! Merkle proof lookup trait.

use async_trait::async_trait;
use payd_types::{MerkleProof, TxId};

use crate::StoreError;

#[async_trait]
pub trait MerkleProofStore: Send + Sync {
    /// Fetch the proof for a confirmed transaction.
    ///
    /// `Ok(None)` means the transaction is not confirmed yet, which is not an error.
    async fn merkle_proof(&self, id: &TxId) -> Result<Option<MerkleProof>, StoreError>;
}
