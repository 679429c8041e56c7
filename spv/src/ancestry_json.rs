//! Nested JSON projection of an ancestry.
//!
//! Each node carries its raw tx and either a proof (anchored, never
//! descended) or the parents it spends from, keyed by tx id. Shared
//! ancestors are repeated under every child that spends them. Ancestors
//! the payment tx cannot reach are not part of this projection.

use std::collections::BTreeMap;

use payd_transactions::Transaction;
use payd_types::{MapiCallback, MerkleProof, TxId};
use serde::{Deserialize, Serialize};

use crate::{Ancestor, Ancestry, SpvError, TscAncestriesJson};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AncestryJson {
    #[serde(default, skip_serializing_if = "TxId::is_zero")]
    pub txid: TxId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_tx: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<MerkleProof>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapi_responses: Vec<MapiCallback>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parents: BTreeMap<TxId, AncestryJson>,
}

impl AncestryJson {
    /// Project a decoded ancestry into nested form, rooted at the payment tx.
    pub fn from_ancestry(ancestry: &Ancestry) -> Result<Self, SpvError> {
        Self::project(ancestry, &ancestry.payment_tx, ancestry.payment_tx_id(), None, &[])
    }

    fn project(
        ancestry: &Ancestry,
        tx: &Transaction,
        txid: TxId,
        proof: Option<&[u8]>,
        mapi_responses: &[MapiCallback],
    ) -> Result<Self, SpvError> {
        let mut node = Self {
            txid,
            raw_tx: tx.to_hex(),
            proof: proof.map(MerkleProof::from_bytes).transpose()?,
            mapi_responses: mapi_responses.to_vec(),
            parents: BTreeMap::new(),
        };
        if node.proof.is_none() {
            for (parent_id, parent) in ancestry.parents_of(tx) {
                let parent_node = Self::project(
                    ancestry,
                    &parent.tx,
                    parent_id,
                    parent.proof.as_deref(),
                    &parent.mapi_responses,
                )?;
                node.parents.insert(parent_id, parent_node);
            }
        }
        Ok(node)
    }

    /// Flatten back into the arena form. The root is the payment tx and must
    /// not carry a proof; shared ancestors keep their first occurrence.
    pub fn to_ancestry(&self) -> Result<Ancestry, SpvError> {
        if self.is_anchored() {
            return Err(SpvError::TipTxConfirmed);
        }
        let payment = self.tx()?;
        let mut ancestry = Ancestry::new(payment);

        let mut stack: Vec<(TxId, &AncestryJson)> =
            self.parents.iter().rev().map(|(id, node)| (*id, node)).collect();
        while let Some((key, node)) = stack.pop() {
            let tx = node.tx()?;
            let id = tx.tx_id();
            if id != key {
                return Err(SpvError::Malformed(format!(
                    "parent keyed {key} holds tx {id}"
                )));
            }
            if ancestry.contains(&id) {
                continue;
            }

            let proof = node.proof.as_ref().map(MerkleProof::to_bytes).transpose()?;
            let ancestor = Ancestor {
                tx,
                proof,
                mapi_responses: node.mapi_responses.clone(),
            };
            ancestry.insert(ancestor)?;

            if !node.is_anchored() {
                stack.extend(node.parents.iter().rev().map(|(id, parent)| (*id, parent)));
            }
        }
        Ok(ancestry)
    }

    /// Parse `raw_tx`, checking it against `txid` when one is given.
    fn tx(&self) -> Result<Transaction, SpvError> {
        let tx = Transaction::from_hex(&self.raw_tx)?;
        if !self.txid.is_zero() && tx.tx_id() != self.txid {
            return Err(SpvError::Malformed(format!(
                "txid {} does not match rawTx {}",
                self.txid,
                tx.tx_id()
            )));
        }
        Ok(tx)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SpvError> {
        self.to_ancestry()?.to_bytes()
    }

    pub fn from_bytes(b: &[u8]) -> Result<Self, SpvError> {
        Self::from_ancestry(&Ancestry::from_bytes(b)?)
    }

    /// Convert to the flat TSC list through the binary form.
    pub fn to_tsc(&self) -> Result<TscAncestriesJson, SpvError> {
        TscAncestriesJson::from_bytes(&self.to_bytes()?)
    }

    pub fn is_anchored(&self) -> bool {
        self.proof.is_some()
    }

    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }

    /// The immediate parent `txid`, decoded.
    pub fn parent_tx(&self, txid: &TxId) -> Result<Transaction, SpvError> {
        let parent = self
            .parents
            .get(txid)
            .ok_or(SpvError::NotAllInputsSupplied { txid: *txid })?;
        Ok(Transaction::from_hex(&parent.raw_tx)?)
    }
}
