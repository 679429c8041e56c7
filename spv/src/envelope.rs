//! The legacy `Envelope` JSON shape, kept only as an import/export format.
//!
//! Envelopes use the same field names as [`AncestryJson`] but key parents by
//! plain strings and may omit `rawTx` when the proof embeds the full tx.

use std::collections::BTreeMap;

use payd_types::{MapiCallback, MerkleProof, TxId};
use serde::{Deserialize, Serialize};

use crate::{AncestryJson, SpvError};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub txid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_tx: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<MerkleProof>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapi_responses: Vec<MapiCallback>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parents: BTreeMap<String, Envelope>,
}

impl TryFrom<Envelope> for AncestryJson {
    type Error = SpvError;

    fn try_from(env: Envelope) -> Result<Self, Self::Error> {
        let raw_tx = if !env.raw_tx.is_empty() {
            env.raw_tx
        } else {
            match env.proof.as_ref().filter(|p| p.carries_tx()) {
                Some(proof) => proof.tx_or_id.clone(),
                None => {
                    return Err(SpvError::Malformed(format!(
                        "envelope {} has neither rawTx nor a proof carrying the tx",
                        env.txid
                    )))
                }
            }
        };
        let txid = if env.txid.is_empty() {
            TxId::ZERO
        } else {
            TxId::from_hex(&env.txid)?
        };

        let parents = env
            .parents
            .into_iter()
            .map(|(key, parent)| -> Result<(TxId, AncestryJson), SpvError> {
                Ok((TxId::from_hex(&key)?, AncestryJson::try_from(parent)?))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(AncestryJson {
            txid,
            raw_tx,
            proof: env.proof,
            mapi_responses: env.mapi_responses,
            parents,
        })
    }
}

impl From<AncestryJson> for Envelope {
    fn from(json: AncestryJson) -> Self {
        Envelope {
            txid: if json.txid.is_zero() {
                String::new()
            } else {
                json.txid.to_hex()
            },
            raw_tx: json.raw_tx,
            proof: json.proof,
            mapi_responses: json.mapi_responses,
            parents: json
                .parents
                .into_iter()
                .map(|(id, parent)| (id.to_hex(), Envelope::from(parent)))
                .collect(),
        }
    }
}
