//! The ancestry graph and its binary form.
//!
//! The graph is an arena: ancestors are keyed by tx id and point at their
//! parents through the previous tx ids of their inputs. The payment tx is
//! held apart from the arena.
//!
//! Binary form (version 1):
//!
//! ```text
//! 0x01 | TX(payment) | for each ancestor: TX [PROOF] [MAPI_LIST]
//! ```
//!
//! Ancestors are written depth first from the payment tx. Anchored ancestors
//! are not descended; anything unreachable is appended in id order.

use std::collections::{BTreeMap, BTreeSet};

use payd_transactions::Transaction;
use payd_types::{MapiCallback, TxId};

use crate::chunk::{encode_chunk, Chunk, ChunkReader, TAG_PROOF, TAG_TX};
use crate::SpvError;

/// The only binary format version understood.
pub const ANCESTRY_VERSION_1: u8 = 1;

/// One prior transaction in an ancestry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ancestor {
    pub tx: Transaction,
    /// TSC binary merkle proof. Present means anchored.
    pub proof: Option<Vec<u8>>,
    pub mapi_responses: Vec<MapiCallback>,
}

impl Ancestor {
    pub fn new(tx: Transaction) -> Self {
        Self {
            tx,
            proof: None,
            mapi_responses: Vec::new(),
        }
    }

    pub fn with_proof(mut self, proof: Vec<u8>) -> Self {
        self.proof = Some(proof);
        self
    }

    pub fn with_mapi_responses(mut self, responses: Vec<MapiCallback>) -> Self {
        self.mapi_responses = responses;
        self
    }

    pub fn is_anchored(&self) -> bool {
        self.proof.is_some()
    }
}

/// A payment transaction and the ancestors proving its inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ancestry {
    pub payment_tx: Transaction,
    pub ancestors: BTreeMap<TxId, Ancestor>,
}

impl Ancestry {
    pub fn new(payment_tx: Transaction) -> Self {
        Self {
            payment_tx,
            ancestors: BTreeMap::new(),
        }
    }

    pub fn payment_tx_id(&self) -> TxId {
        self.payment_tx.tx_id()
    }

    /// Add an ancestor keyed by its own id. Each id may appear once, and
    /// never as the payment tx's id.
    pub fn insert(&mut self, ancestor: Ancestor) -> Result<TxId, SpvError> {
        let id = ancestor.tx.tx_id();
        self.insert_as(id, ancestor)?;
        Ok(id)
    }

    fn insert_as(&mut self, id: TxId, ancestor: Ancestor) -> Result<(), SpvError> {
        if self.ancestors.contains_key(&id) || id == self.payment_tx_id() {
            return Err(SpvError::DuplicateAncestor { txid: id });
        }
        self.ancestors.insert(id, ancestor);
        Ok(())
    }

    pub fn get(&self, id: &TxId) -> Option<&Ancestor> {
        self.ancestors.get(id)
    }

    pub fn contains(&self, id: &TxId) -> bool {
        self.ancestors.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// The parents of `tx` present in this ancestry, in id order.
    pub fn parents_of<'a>(
        &'a self,
        tx: &Transaction,
    ) -> impl Iterator<Item = (TxId, &'a Ancestor)> + 'a {
        tx.parent_ids()
            .into_iter()
            .filter_map(move |id| self.ancestors.get(&id).map(|a| (id, a)))
    }

    /// Ancestor ids in wire order: depth first from the payment tx (not
    /// descending anchored ancestors), then everything unreachable in id order.
    pub fn walk_order(&self) -> Vec<TxId> {
        let mut order = Vec::with_capacity(self.ancestors.len());
        let mut seen = BTreeSet::new();

        let mut stack: Vec<TxId> = self.parents_of(&self.payment_tx).map(|(id, _)| id).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            let Some(ancestor) = self.ancestors.get(&id) else {
                continue;
            };
            if ancestor.is_anchored() {
                continue;
            }
            let first = stack.len();
            stack.extend(
                self.parents_of(&ancestor.tx)
                    .map(|(parent, _)| parent)
                    .filter(|parent| !seen.contains(parent)),
            );
            stack[first..].reverse();
        }

        order.extend(self.ancestors.keys().filter(|id| !seen.contains(*id)).copied());
        order
    }

    /// Encode to the version 1 binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SpvError> {
        let mut buf = vec![ANCESTRY_VERSION_1];
        encode_chunk(TAG_TX, &self.payment_tx.to_bytes(), &mut buf);

        for id in self.walk_order() {
            let Some(ancestor) = self.ancestors.get(&id) else {
                continue;
            };
            encode_chunk(TAG_TX, &ancestor.tx.to_bytes(), &mut buf);
            if let Some(proof) = &ancestor.proof {
                encode_chunk(TAG_PROOF, proof, &mut buf);
            }
            if !ancestor.mapi_responses.is_empty() {
                Chunk::MapiList(ancestor.mapi_responses.clone()).encode_into(&mut buf)?;
            }
        }
        Ok(buf)
    }

    /// Decode the binary form, dispatching on the version byte.
    pub fn from_bytes(b: &[u8]) -> Result<Self, SpvError> {
        let (&version, _) = b.split_first().ok_or(SpvError::EmptyAncestry)?;
        match version {
            ANCESTRY_VERSION_1 => Self::decode_v1(b),
            other => Err(SpvError::UnsupportedVersion(other)),
        }
    }

    fn decode_v1(b: &[u8]) -> Result<Self, SpvError> {
        let mut chunks = ChunkReader::new(b, 1);

        let payment_tx = match chunks.next().transpose()? {
            Some(Chunk::Tx(raw)) => Transaction::from_bytes(&raw)?,
            _ => return Err(SpvError::MissingTipTx),
        };
        let mut ancestry = Ancestry::new(payment_tx);
        let mut cursor: Option<TxId> = None;

        for chunk in chunks {
            match chunk? {
                Chunk::Tx(raw) => {
                    let tx = Transaction::from_bytes(&raw)?;
                    let id = payd_crypto::hash_transaction(&raw);
                    ancestry.insert_as(id, Ancestor::new(tx))?;
                    cursor = Some(id);
                }
                Chunk::Proof(proof) => {
                    let ancestor = ancestry.cursor_mut(cursor).ok_or(SpvError::TipTxConfirmed)?;
                    if ancestor.proof.is_some() {
                        return Err(SpvError::Malformed(format!(
                            "second proof for tx {}",
                            ancestor.tx.tx_id()
                        )));
                    }
                    ancestor.proof = Some(proof);
                }
                Chunk::MapiList(responses) => {
                    let ancestor = ancestry.cursor_mut(cursor).ok_or_else(|| {
                        SpvError::Malformed("mAPI responses attached to the payment tx".into())
                    })?;
                    if !ancestor.mapi_responses.is_empty() {
                        return Err(SpvError::Malformed(format!(
                            "second mAPI list for tx {}",
                            ancestor.tx.tx_id()
                        )));
                    }
                    ancestor.mapi_responses = responses;
                }
            }
        }

        tracing::trace!(
            payment = %ancestry.payment_tx_id(),
            ancestors = ancestry.len(),
            "decoded ancestry"
        );
        Ok(ancestry)
    }

    fn cursor_mut(&mut self, cursor: Option<TxId>) -> Option<&mut Ancestor> {
        match cursor {
            Some(id) => self.ancestors.get_mut(&id),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payd_transactions::{Script, TxInput, TxOutput};

    fn tx(parents: &[TxId], marker: u8) -> Transaction {
        Transaction {
            version: 1,
            inputs: parents
                .iter()
                .map(|p| TxInput {
                    previous_tx_id: *p,
                    previous_tx_out_index: 0,
                    unlocking_script: Script::new(vec![marker]),
                    sequence: u32::MAX,
                    previous_tx_satoshis: None,
                })
                .collect(),
            outputs: vec![TxOutput {
                satoshis: 1000,
                locking_script: Script::new(vec![0x51, marker]),
            }],
            lock_time: 0,
        }
    }

    /// payment <- a <- b (anchored), payment <- c (anchored)
    fn sample() -> (Ancestry, [TxId; 3]) {
        let b = tx(&[TxId::new([0xB0; 32])], 2);
        let b_id = b.tx_id();
        let a = tx(&[b_id], 1);
        let a_id = a.tx_id();
        let c = tx(&[TxId::new([0xC0; 32])], 3);
        let c_id = c.tx_id();
        let payment = tx(&[a_id, c_id], 0);

        let mut ancestry = Ancestry::new(payment);
        ancestry.insert(Ancestor::new(a)).unwrap();
        ancestry.insert(Ancestor::new(b).with_proof(vec![0xEE; 4])).unwrap();
        ancestry
            .insert(Ancestor::new(c).with_proof(vec![0xDD; 4]).with_mapi_responses(vec![
                MapiCallback {
                    block_height: 10,
                    ..Default::default()
                },
            ]))
            .unwrap();
        (ancestry, [a_id, b_id, c_id])
    }

    #[test]
    fn binary_roundtrip() {
        let (ancestry, _) = sample();
        let bytes = ancestry.to_bytes().unwrap();
        assert_eq!(bytes[0], ANCESTRY_VERSION_1);
        assert_eq!(Ancestry::from_bytes(&bytes).unwrap(), ancestry);
    }

    #[test]
    fn walk_is_depth_first_from_the_payment() {
        let (ancestry, [a, b, c]) = sample();
        let order = ancestry.walk_order();
        let pos = |id| order.iter().position(|x| *x == id).unwrap();
        assert_eq!(order.len(), 3);
        assert_eq!(pos(b), pos(a) + 1);
        assert!(order.contains(&c));
    }

    #[test]
    fn unreachable_ancestors_are_still_written() {
        let (mut ancestry, _) = sample();
        let stray = tx(&[TxId::new([0x55; 32])], 9);
        let stray_id = ancestry.insert(Ancestor::new(stray)).unwrap();
        assert_eq!(ancestry.walk_order().last(), Some(&stray_id));
        let back = Ancestry::from_bytes(&ancestry.to_bytes().unwrap()).unwrap();
        assert!(back.contains(&stray_id));
    }

    #[test]
    fn version_gate() {
        let (ancestry, _) = sample();
        let mut bytes = ancestry.to_bytes().unwrap();
        bytes[0] = 2;
        assert_eq!(Ancestry::from_bytes(&bytes), Err(SpvError::UnsupportedVersion(2)));
        assert_eq!(Ancestry::from_bytes(&[]), Err(SpvError::EmptyAncestry));
    }

    #[test]
    fn stream_must_open_with_the_payment_tx() {
        assert_eq!(Ancestry::from_bytes(&[1]), Err(SpvError::MissingTipTx));
        let mut bytes = vec![1];
        encode_chunk(TAG_PROOF, &[1, 2, 3], &mut bytes);
        assert_eq!(Ancestry::from_bytes(&bytes), Err(SpvError::MissingTipTx));
    }

    #[test]
    fn proof_on_the_payment_is_rejected() {
        let (ancestry, _) = sample();
        let mut bytes = vec![1];
        encode_chunk(TAG_TX, &ancestry.payment_tx.to_bytes(), &mut bytes);
        encode_chunk(TAG_PROOF, &[0xAA; 8], &mut bytes);
        assert_eq!(Ancestry::from_bytes(&bytes), Err(SpvError::TipTxConfirmed));
    }

    #[test]
    fn duplicates_are_rejected() {
        let (ancestry, [a, ..]) = sample();
        let mut bytes = ancestry.to_bytes().unwrap();
        encode_chunk(TAG_TX, &ancestry.get(&a).unwrap().tx.to_bytes(), &mut bytes);
        assert_eq!(
            Ancestry::from_bytes(&bytes),
            Err(SpvError::DuplicateAncestor { txid: a })
        );

        let mut bytes = ancestry.to_bytes().unwrap();
        encode_chunk(TAG_TX, &ancestry.payment_tx.to_bytes(), &mut bytes);
        assert_eq!(
            Ancestry::from_bytes(&bytes),
            Err(SpvError::DuplicateAncestor {
                txid: ancestry.payment_tx_id()
            })
        );
    }

    #[test]
    fn second_proof_for_one_tx_is_malformed() {
        let (ancestry, [_, b, _]) = sample();
        let mut bytes = vec![1];
        encode_chunk(TAG_TX, &ancestry.payment_tx.to_bytes(), &mut bytes);
        encode_chunk(TAG_TX, &ancestry.get(&b).unwrap().tx.to_bytes(), &mut bytes);
        encode_chunk(TAG_PROOF, &[1], &mut bytes);
        encode_chunk(TAG_PROOF, &[2], &mut bytes);
        assert!(matches!(Ancestry::from_bytes(&bytes), Err(SpvError::Malformed(_))));
    }

    #[test]
    fn parents_of_only_yields_present_ancestors() {
        let (ancestry, [a, _, c]) = sample();
        let parents: Vec<TxId> = ancestry.parents_of(&ancestry.payment_tx).map(|(id, _)| id).collect();
        let mut expected = vec![a, c];
        expected.sort();
        assert_eq!(parents, expected);

        let a_tx = &ancestry.get(&a).unwrap().tx;
        assert_eq!(ancestry.parents_of(a_tx).count(), 1);
    }
}
