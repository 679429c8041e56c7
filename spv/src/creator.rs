//! Builds the ancestry of a transaction from live stores.

use std::sync::Arc;

use payd_store::{MerkleProofStore, StoreError, TxStore};
use payd_transactions::Transaction;
use payd_types::TxId;
use tracing::debug;

use crate::{Ancestor, Ancestry, AncestryJson, SpvError};

/// Walks back from a transaction through its inputs until every branch ends
/// at a confirmed (proven) parent.
pub struct AncestryCreator {
    txs: Arc<dyn TxStore>,
    proofs: Arc<dyn MerkleProofStore>,
}

impl AncestryCreator {
    pub fn new(txs: Arc<dyn TxStore>, proofs: Arc<dyn MerkleProofStore>) -> Self {
        Self { txs, proofs }
    }

    /// Build the ancestry of `tx`.
    ///
    /// Every parent is fetched once, however many inputs or descendants
    /// spend it. Parents with a proof end their branch. Any lookup failure
    /// aborts the whole build.
    pub async fn create_ancestry(&self, tx: &Transaction) -> Result<Ancestry, SpvError> {
        let payment_id = tx.tx_id();
        if tx.inputs.is_empty() {
            return Err(SpvError::NoTxInputs { txid: payment_id });
        }

        let mut ancestry = Ancestry::new(tx.clone());
        let mut pending: Vec<TxId> = tx.parent_ids().into_iter().rev().collect();

        while let Some(id) = pending.pop() {
            if id == payment_id || ancestry.contains(&id) {
                continue;
            }

            let proof = self
                .proofs
                .merkle_proof(&id)
                .await
                .map_err(|source| SpvError::Store { txid: id, source })?;
            let parent = self
                .txs
                .tx(&id)
                .await
                .map_err(|source| SpvError::Store { txid: id, source })?
                .ok_or(SpvError::TxNotFound { txid: id })?;
            if parent.tx_id() != id {
                return Err(SpvError::Store {
                    txid: id,
                    source: StoreError::Corruption(format!("stored tx hashes to {}", parent.tx_id())),
                });
            }

            let ancestor = match proof {
                Some(proof) => {
                    debug!(txid = %id, "parent is anchored");
                    Ancestor::new(parent).with_proof(proof.to_bytes()?)
                }
                None => {
                    if parent.inputs.is_empty() {
                        return Err(SpvError::NoTxInputs { txid: id });
                    }
                    debug!(txid = %id, inputs = parent.inputs.len(), "parent is unconfirmed, recursing");
                    pending.extend(parent.parent_ids().into_iter().rev());
                    Ancestor::new(parent)
                }
            };
            ancestry.insert(ancestor)?;
        }

        debug!(payment = %payment_id, ancestors = ancestry.len(), "ancestry built");
        Ok(ancestry)
    }

    /// Build the ancestry of `tx` in nested JSON form.
    pub async fn create_ancestry_json(&self, tx: &Transaction) -> Result<AncestryJson, SpvError> {
        AncestryJson::from_ancestry(&self.create_ancestry(tx).await?)
    }
}
