//! Transaction lookup trait.

use async_trait::async_trait;
use payd_transactions::Transaction;
use payd_types::TxId;

use crate::StoreError;

#[async_trait]
pub trait TxStore: Send + Sync {
    /// Fetch a transaction by id. `Ok(None)` when the store does not know it.
    async fn tx(&self, id: &TxId) -> Result<Option<Transaction>, StoreError>;
}
