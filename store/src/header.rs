//! Block header lookup trait.

use async_trait::async_trait;
use payd_types::{BlockHash, BlockHeader};

use crate::StoreError;

/// A view of the best chain's headers.
#[async_trait]
pub trait BlockHeaderChain: Send + Sync {
    /// The header with this hash, if it is part of the chain.
    async fn block_header(&self, hash: &BlockHash) -> Result<Option<BlockHeader>, StoreError>;

    /// The hash of the chain block whose header commits to `merkle_root`, if any.
    async fn block_by_merkle_root(
        &self,
        merkle_root: &[u8; 32],
    ) -> Result<Option<BlockHash>, StoreError>;
}
