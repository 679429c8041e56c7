//! Transaction model and the legacy raw wire codec.
//!
//! ```text
//! version(u32) | n_in(varint) | inputs | n_out(varint) | outputs | lock_time(u32)
//! input  = prev_txid(32) | prev_vout(u32) | script(varint len + bytes) | sequence(u32)
//! output = satoshis(u64) | script(varint len + bytes)
//! ```

use std::collections::BTreeSet;

use payd_types::{ByteReader, PaydError, TxId, VarInt};
use serde::{Deserialize, Serialize};

use crate::{Script, TransactionError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInput {
    pub previous_tx_id: TxId,
    pub previous_tx_out_index: u32,
    pub unlocking_script: Script,
    pub sequence: u32,
    /// Value of the spent output. Not part of the wire form; filled in by
    /// whoever knows the parent transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_tx_satoshis: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutput {
    pub satoshis: u64,
    pub locking_script: Script,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Parse a raw transaction. Trailing bytes are rejected.
    pub fn from_bytes(b: &[u8]) -> Result<Self, TransactionError> {
        let mut r = ByteReader::new(b);
        let tx = Self::read_from(&mut r)?;
        r.finish("transaction")?;
        Ok(tx)
    }

    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        let raw = hex::decode(s).map_err(PaydError::from)?;
        Self::from_bytes(&raw)
    }

    /// Read one transaction from the front of `r`.
    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        let version = r.read_u32_le()?;

        // every input and output takes at least one byte, so read_len bounds the counts
        let n_in = r.read_len()?;
        let mut inputs = Vec::with_capacity(n_in);
        for _ in 0..n_in {
            inputs.push(TxInput {
                previous_tx_id: TxId::new(r.read_array()?),
                previous_tx_out_index: r.read_u32_le()?,
                unlocking_script: Script::from(r.read_var_bytes()?),
                sequence: r.read_u32_le()?,
                previous_tx_satoshis: None,
            });
        }

        let n_out = r.read_len()?;
        let mut outputs = Vec::with_capacity(n_out);
        for _ in 0..n_out {
            outputs.push(TxOutput {
                satoshis: r.read_u64_le()?,
                locking_script: Script::from(r.read_var_bytes()?),
            });
        }

        let lock_time = r.read_u32_le()?;
        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size_hint());
        buf.extend_from_slice(&self.version.to_le_bytes());

        VarInt::from(self.inputs.len()).encode_into(&mut buf);
        for input in &self.inputs {
            buf.extend_from_slice(input.previous_tx_id.as_bytes());
            buf.extend_from_slice(&input.previous_tx_out_index.to_le_bytes());
            VarInt::from(input.unlocking_script.len()).encode_into(&mut buf);
            buf.extend_from_slice(input.unlocking_script.as_bytes());
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }

        VarInt::from(self.outputs.len()).encode_into(&mut buf);
        for output in &self.outputs {
            buf.extend_from_slice(&output.satoshis.to_le_bytes());
            VarInt::from(output.locking_script.len()).encode_into(&mut buf);
            buf.extend_from_slice(output.locking_script.as_bytes());
        }

        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// SHA-256d of the raw serialization.
    pub fn tx_id(&self) -> TxId {
        payd_crypto::hash_transaction(&self.to_bytes())
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Distinct parent transaction ids, in id order.
    pub fn parent_ids(&self) -> BTreeSet<TxId> {
        self.inputs.iter().map(|i| i.previous_tx_id).collect()
    }

    pub fn is_coinbase(&self) -> bool {
        matches!(self.inputs.as_slice(), [only] if only.previous_tx_id.is_zero() && only.previous_tx_out_index == u32::MAX)
    }

    pub fn total_output_satoshis(&self) -> Result<u64, TransactionError> {
        self.outputs.iter().try_fold(0u64, |acc, o| {
            acc.checked_add(o.satoshis)
                .ok_or(TransactionError::SatoshiOverflow)
        })
    }

    /// Sum of the spent outputs. Every input must have its previous satoshis filled in.
    pub fn total_input_satoshis(&self) -> Result<u64, TransactionError> {
        self.inputs
            .iter()
            .enumerate()
            .try_fold(0u64, |acc, (vin, input)| {
                let sats = input
                    .previous_tx_satoshis
                    .ok_or(TransactionError::MissingPreviousSatoshis { vin })?;
                acc.checked_add(sats).ok_or(TransactionError::SatoshiOverflow)
            })
    }

    fn size_hint(&self) -> usize {
        let inputs: usize = self
            .inputs
            .iter()
            .map(|i| 32 + 4 + 9 + i.unlocking_script.len() + 4)
            .sum();
        let outputs: usize = self
            .outputs
            .iter()
            .map(|o| 8 + 9 + o.locking_script.len())
            .sum();
        4 + 9 + inputs + 9 + outputs + 4
    }
}
