//! Merkle proof verification against a chain of block headers.

use async_trait::async_trait;
use payd_crypto::{branch_root, hash_header, hash_transaction};
use payd_store::BlockHeaderChain;
use payd_types::{BlockHash, MerkleProof, PaydError, TargetType, TxId};
use serde::Serialize;
use tracing::debug;

use crate::SpvError;

/// Outcome of checking one merkle proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProofValidation {
    /// The tx the proof is for.
    pub tx_id: TxId,
    pub valid: bool,
    /// The block the proof names or resolved to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<BlockHash>,
}

impl MerkleProofValidation {
    fn invalid(tx_id: TxId, block_hash: Option<BlockHash>) -> Self {
        Self {
            tx_id,
            valid: false,
            block_hash,
        }
    }
}

/// The tx a proof is for: its txid, or the hash of the tx it carries.
pub(crate) fn claimed_tx_id(proof: &MerkleProof) -> Result<TxId, PaydError> {
    match proof.tx_id()? {
        Some(id) => Ok(id),
        None => {
            let raw = proof.raw_tx()?.ok_or(PaydError::MissingTxIdInProof)?;
            Ok(hash_transaction(&raw))
        }
    }
}

/// Checks TSC binary merkle proofs.
#[async_trait]
pub trait MerkleProofVerifier: Send + Sync {
    async fn verify_merkle_proof(&self, proof: &[u8]) -> Result<MerkleProofValidation, SpvError>;
}

/// A [`MerkleProofVerifier`] that resolves proof targets through a [`BlockHeaderChain`].
///
/// Unknown blocks make a proof invalid; a failing chain backend is an error.
pub struct HeaderChainVerifier<C> {
    chain: C,
}

impl<C: BlockHeaderChain> HeaderChainVerifier<C> {
    pub fn new(chain: C) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    async fn header_root(
        &self,
        tx_id: TxId,
        hash: BlockHash,
    ) -> Result<Option<[u8; 32]>, SpvError> {
        let header = self
            .chain
            .block_header(&hash)
            .await
            .map_err(|source| SpvError::Store { txid: tx_id, source })?;
        Ok(header.map(|h| h.merkle_root))
    }
}

#[async_trait]
impl<C: BlockHeaderChain> MerkleProofVerifier for HeaderChainVerifier<C> {
    async fn verify_merkle_proof(&self, bytes: &[u8]) -> Result<MerkleProofValidation, SpvError> {
        let proof = MerkleProof::from_bytes(bytes)?;
        let tx_id = claimed_tx_id(&proof)?;

        let root = match branch_root(*tx_id.as_bytes(), proof.index, &proof.node_hashes()?) {
            Ok(root) => root,
            Err(e) => {
                debug!(%tx_id, error = %e, "merkle branch rejected");
                return Ok(MerkleProofValidation::invalid(tx_id, None));
            }
        };

        let (expected, block_hash) = match proof.target_type {
            TargetType::MerkleRoot => {
                let target = proof.target_hash()?;
                let hash = self
                    .chain
                    .block_by_merkle_root(&target)
                    .await
                    .map_err(|source| SpvError::Store { txid: tx_id, source })?;
                (hash.map(|_| target), hash)
            }
            TargetType::Hash => {
                let hash = BlockHash::new(proof.target_hash()?);
                (self.header_root(tx_id, hash).await?, Some(hash))
            }
            TargetType::Header => {
                let header = proof.target_header()?;
                let hash = hash_header(&header);
                let known = self.header_root(tx_id, hash).await?.is_some();
                (known.then_some(header.merkle_root), Some(hash))
            }
        };

        let Some(expected) = expected else {
            debug!(%tx_id, block = ?block_hash, "proof targets an unknown block");
            return Ok(MerkleProofValidation::invalid(tx_id, block_hash));
        };

        Ok(MerkleProofValidation {
            tx_id,
            valid: root == expected,
            block_hash,
        })
    }
}
