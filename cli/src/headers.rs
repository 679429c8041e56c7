//! An in-memory header chain loaded from a JSON file.
//!
//! The file is a JSON array of raw 80-byte header hex strings:
//!
//! ```json
//! ["0100000000000000...", "01000000..."]
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use payd_store::{BlockHeaderChain, StoreError};
use payd_types::{BlockHash, BlockHeader};

#[derive(Debug, Default)]
pub struct MemoryHeaderChain {
    headers: HashMap<BlockHash, BlockHeader>,
}

impl MemoryHeaderChain {
    pub fn from_headers(headers: impl IntoIterator<Item = BlockHeader>) -> Self {
        let headers = headers
            .into_iter()
            .map(|h| (payd_crypto::hash_header(&h), h))
            .collect();
        Self { headers }
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let raw: Vec<String> = serde_json::from_str(s).context("headers file must be a JSON array of hex strings")?;
        let headers = raw
            .iter()
            .enumerate()
            .map(|(i, hex)| BlockHeader::from_hex(hex).with_context(|| format!("header #{i}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self::from_headers(headers))
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read headers from {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[async_trait]
impl BlockHeaderChain for MemoryHeaderChain {
    async fn block_header(&self, hash: &BlockHash) -> Result<Option<BlockHeader>, StoreError> {
        Ok(self.headers.get(hash).copied())
    }

    async fn block_by_merkle_root(
        &self,
        merkle_root: &[u8; 32],
    ) -> Result<Option<BlockHash>, StoreError> {
        Ok(self
            .headers
            .iter()
            .find(|(_, h)| &h.merkle_root == merkle_root)
            .map(|(hash, _)| *hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_HEADER: &str = concat!(
        "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd",
        "7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c"
    );

    #[tokio::test]
    async fn loads_genesis() {
        let chain = MemoryHeaderChain::from_json(&format!("[\"{GENESIS_HEADER}\"]")).unwrap();
        assert_eq!(chain.len(), 1);
        let hash: BlockHash = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
            .parse()
            .unwrap();
        let header = chain.block_header(&hash).await.unwrap().unwrap();
        assert_eq!(header.nonce, 2_083_236_893);
        assert_eq!(chain.block_by_merkle_root(&header.merkle_root).await.unwrap(), Some(hash));
        assert_eq!(chain.block_by_merkle_root(&[0u8; 32]).await.unwrap(), None);
    }

    #[test]
    fn bad_header_is_reported_by_position() {
        let err = MemoryHeaderChain::from_json(&format!("[\"{GENESIS_HEADER}\", \"abcd\"]")).unwrap_err();
        assert!(format!("{err:#}").contains("header #1"));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("headers.json");
        std::fs::write(&path, format!("[\"{GENESIS_HEADER}\"]")).unwrap();
        assert_eq!(MemoryHeaderChain::from_file(&path).unwrap().len(), 1);
    }
}
