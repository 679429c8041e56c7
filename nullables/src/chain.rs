//! Nullable header chain: a fixed set of known block headers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use payd_store::{BlockHeaderChain, StoreError};
use payd_types::{BlockHash, BlockHeader};

#[derive(Default)]
pub struct NullHeaderChain {
    headers: Mutex<HashMap<BlockHash, BlockHeader>>,
    failure: Mutex<Option<StoreError>>,
}

impl NullHeaderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain that already knows `headers`.
    pub fn with_headers(headers: impl IntoIterator<Item = BlockHeader>) -> Self {
        let chain = Self::new();
        for header in headers {
            chain.add(header);
        }
        chain
    }

    /// Add a header and return its hash.
    pub fn add(&self, header: BlockHeader) -> BlockHash {
        let hash = payd_crypto::hash_header(&header);
        self.headers.lock().unwrap().insert(hash, header);
        hash
    }

    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn len(&self) -> usize {
        self.headers.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlockHeaderChain for NullHeaderChain {
    async fn block_header(&self, hash: &BlockHash) -> Result<Option<BlockHeader>, StoreError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.headers.lock().unwrap().get(hash).cloned())
    }

    async fn block_by_merkle_root(
        &self,
        merkle_root: &[u8; 32],
    ) -> Result<Option<BlockHash>, StoreError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        let headers = self.headers.lock().unwrap();
        Ok(headers
            .iter()
            .find(|(_, h)| &h.merkle_root == merkle_root)
            .map(|(hash, _)| *hash))
    }
}
