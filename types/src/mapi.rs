//! mAPI callback records.
//!
//! A callback is what a miner posts back after accepting (or mining) a
//! broadcast transaction. The SPV engine carries these for audit only and
//! never interprets them.

use serde::{Deserialize, Serialize};

use crate::PaydError;

/// The body a Merchant API server posts to a callback url.
///
/// Fields a producer leaves out decode as empty or zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapiCallback {
    pub callback_payload: String,
    pub api_version: String,
    pub timestamp: String,
    pub miner_id: String,
    pub block_hash: String,
    pub block_height: u64,
    pub callback_tx_id: String,
    pub callback_reason: String,
}

impl MapiCallback {
    /// Parse the JSON byte form.
    pub fn from_bytes(b: &[u8]) -> Result<Self, PaydError> {
        Ok(serde_json::from_slice(b)?)
    }

    /// The canonical JSON byte form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PaydError> {
        Ok(serde_json::to_vec(self)?)
    }
}
