//! Nullable stores: thread-safe in-memory transaction and proof lookups.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use payd_store::{MerkleProofStore, StoreError, TxStore};
use payd_transactions::Transaction;
use payd_types::{MerkleProof, TxId};

/// An in-memory transaction store that counts lookups per id.
#[derive(Default)]
pub struct NullTxStore {
    txs: Mutex<HashMap<TxId, Transaction>>,
    lookups: Mutex<HashMap<TxId, usize>>,
    failure: Mutex<Option<StoreError>>,
}

impl NullTxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a transaction under its own id and return that id.
    pub fn add(&self, tx: Transaction) -> TxId {
        let id = tx.tx_id();
        self.txs.lock().unwrap().insert(id, tx);
        id
    }

    /// Store a transaction under an arbitrary id (for corruption tests).
    pub fn add_as(&self, id: TxId, tx: Transaction) {
        self.txs.lock().unwrap().insert(id, tx);
    }

    /// Make every following lookup fail with `err`.
    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    /// How many times `id` has been looked up.
    pub fn lookups(&self, id: &TxId) -> usize {
        self.lookups.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TxStore for NullTxStore {
    async fn tx(&self, id: &TxId) -> Result<Option<Transaction>, StoreError> {
        *self.lookups.lock().unwrap().entry(*id).or_default() += 1;
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.txs.lock().unwrap().get(id).cloned())
    }
}

/// An in-memory merkle proof store. Ids without a proof are unconfirmed.
#[derive(Default)]
pub struct NullMerkleProofStore {
    proofs: Mutex<HashMap<TxId, MerkleProof>>,
    failure: Mutex<Option<StoreError>>,
}

impl NullMerkleProofStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: TxId, proof: MerkleProof) {
        self.proofs.lock().unwrap().insert(id, proof);
    }

    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl MerkleProofStore for NullMerkleProofStore {
    async fn merkle_proof(&self, id: &TxId) -> Result<Option<MerkleProof>, StoreError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.proofs.lock().unwrap().get(id).cloned())
    }
}
