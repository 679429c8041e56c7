//! Flat TSC ancestry JSON: `[{rawtx, proof?, mapiResponses?}]`.
//!
//! The list carries no parent links. Its first record is the payment tx and
//! the rest follow in wire order, so converting to or from the nested form
//! always goes through the binary stream.

use payd_types::{MapiCallback, MerkleProof};
use serde::{Deserialize, Serialize};

use crate::chunk::{encode_chunk, Chunk, TAG_PROOF, TAG_TX};
use crate::{Ancestry, AncestryJson, SpvError, ANCESTRY_VERSION_1};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TscAncestryJson {
    #[serde(rename = "rawtx")]
    pub raw_tx: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<MerkleProof>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapi_responses: Vec<MapiCallback>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TscAncestriesJson(pub Vec<TscAncestryJson>);

impl TscAncestriesJson {
    /// Flatten a decoded ancestry: payment tx first, then ancestors in wire order.
    pub fn from_ancestry(ancestry: &Ancestry) -> Result<Self, SpvError> {
        let mut records = Vec::with_capacity(ancestry.len() + 1);
        records.push(TscAncestryJson {
            raw_tx: ancestry.payment_tx.to_hex(),
            ..Default::default()
        });

        for id in ancestry.walk_order() {
            let Some(ancestor) = ancestry.get(&id) else {
                continue;
            };
            records.push(TscAncestryJson {
                raw_tx: ancestor.tx.to_hex(),
                proof: ancestor
                    .proof
                    .as_deref()
                    .map(MerkleProof::from_bytes)
                    .transpose()?,
                mapi_responses: ancestor.mapi_responses.clone(),
            });
        }
        Ok(Self(records))
    }

    pub fn from_bytes(b: &[u8]) -> Result<Self, SpvError> {
        Self::from_ancestry(&Ancestry::from_bytes(b)?)
    }

    /// Write the records as one linear chunk stream, in list order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SpvError> {
        let mut buf = vec![ANCESTRY_VERSION_1];
        for record in &self.0 {
            let raw = hex::decode(&record.raw_tx).map_err(payd_types::PaydError::from)?;
            encode_chunk(TAG_TX, &raw, &mut buf);
            if let Some(proof) = &record.proof {
                encode_chunk(TAG_PROOF, &proof.to_bytes()?, &mut buf);
            }
            if !record.mapi_responses.is_empty() {
                Chunk::MapiList(record.mapi_responses.clone()).encode_into(&mut buf)?;
            }
        }
        Ok(buf)
    }

    /// Rebuild the nested form through the binary stream.
    pub fn to_nested(&self) -> Result<AncestryJson, SpvError> {
        AncestryJson::from_bytes(&self.to_bytes()?)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
