//! Fee quotes and the fee-sufficiency check.
//!
//! A quote prices two kinds of bytes separately. Data bytes are the locking
//! script bytes of data outputs (`OP_RETURN` / `OP_FALSE OP_RETURN`); every
//! other byte of the serialized transaction is a standard byte. Each share is
//! priced as `bytes * satoshis / unit_bytes`, rounded down.

use serde::{Deserialize, Serialize};

use crate::{Transaction, TransactionError};

/// `satoshis` per `bytes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeUnit {
    pub satoshis: u64,
    pub bytes: u64,
}

impl FeeUnit {
    pub fn new(satoshis: u64, bytes: u64) -> Self {
        Self { satoshis, bytes }
    }

    fn fee_for(&self, size: u64) -> Result<u128, TransactionError> {
        if self.bytes == 0 {
            return Err(TransactionError::ZeroFeeBytes);
        }
        Ok(u128::from(size) * u128::from(self.satoshis) / u128::from(self.bytes))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub standard: FeeUnit,
    pub data: FeeUnit,
}

impl Default for FeeQuote {
    /// Half a satoshi per byte for both kinds of bytes.
    fn default() -> Self {
        Self {
            standard: FeeUnit::new(5, 10),
            data: FeeUnit::new(5, 10),
        }
    }
}

/// Byte split of a serialized transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxSize {
    pub total_bytes: u64,
    pub standard_bytes: u64,
    pub data_bytes: u64,
}

impl FeeQuote {
    pub fn new(standard: FeeUnit, data: FeeUnit) -> Self {
        Self { standard, data }
    }

    /// The same rate for standard and data bytes.
    pub fn flat(satoshis: u64, bytes: u64) -> Self {
        let unit = FeeUnit::new(satoshis, bytes);
        Self::new(unit, unit)
    }

    /// Fee the quote demands for `tx`.
    pub fn expected_fee(&self, tx: &Transaction) -> Result<u64, TransactionError> {
        let size = tx.size_breakdown();
        let total = self.standard.fee_for(size.standard_bytes)? + self.data.fee_for(size.data_bytes)?;
        u64::try_from(total).map_err(|_| TransactionError::SatoshiOverflow)
    }
}

impl Transaction {
    pub fn size_breakdown(&self) -> TxSize {
        let total_bytes = self.size() as u64;
        let data_bytes: u64 = self
            .outputs
            .iter()
            .filter(|o| o.locking_script.is_data())
            .map(|o| o.locking_script.len() as u64)
            .sum();
        TxSize {
            total_bytes,
            standard_bytes: total_bytes - data_bytes,
            data_bytes,
        }
    }

    /// Inputs minus outputs. Fails when previous satoshis are missing;
    /// `None` when the outputs exceed the inputs.
    pub fn fee_paid(&self) -> Result<Option<u64>, TransactionError> {
        let inputs = self.total_input_satoshis()?;
        let outputs = self.total_output_satoshis()?;
        Ok(inputs.checked_sub(outputs))
    }

    /// Whether the fee actually paid covers what `quote` demands.
    pub fn is_fee_paid_enough(&self, quote: &FeeQuote) -> Result<bool, TransactionError> {
        let Some(paid) = self.fee_paid()? else {
            return Ok(false);
        };
        Ok(paid >= quote.expected_fee(self)?)
    }
}

#[cfg(test)]
mod tests {
    use payd_types::TxId;

    use super::*;
    use crate::{Script, TxInput, TxOutput};

    fn tx(input_sats: u64, outputs: Vec<TxOutput>) -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TxInput {
                previous_tx_id: TxId::new([1; 32]),
                previous_tx_out_index: 0,
                unlocking_script: Script::new(vec![0x51; 20]),
                sequence: u32::MAX,
                previous_tx_satoshis: Some(input_sats),
            }],
            outputs,
            lock_time: 0,
        }
    }

    fn p2pkh(sats: u64) -> TxOutput {
        TxOutput {
            satoshis: sats,
            locking_script: Script::new(vec![0x76; 25]),
        }
    }

    #[test]
    fn data_bytes_are_split_out() {
        let data = TxOutput {
            satoshis: 0,
            locking_script: Script::new([vec![0x00, 0x6a], vec![0xAB; 98]].concat()),
        };
        let t = tx(1000, vec![p2pkh(900), data]);
        let size = t.size_breakdown();
        assert_eq!(size.data_bytes, 100);
        assert_eq!(size.standard_bytes + size.data_bytes, size.total_bytes);
    }

    #[test]
    fn expected_fee_rounds_down_per_kind() {
        let t = tx(1000, vec![p2pkh(900)]);
        let size = t.size() as u64;
        let quote = FeeQuote::flat(1, 2);
        assert_eq!(quote.expected_fee(&t).unwrap(), size / 2);
    }

    #[test]
    fn data_bytes_use_the_data_rate() {
        let data = TxOutput {
            satoshis: 0,
            locking_script: Script::new(vec![0x6a; 1000]),
        };
        let t = tx(10_000, vec![data]);
        let size = t.size_breakdown();
        let quote = FeeQuote::new(FeeUnit::new(1, 1), FeeUnit::new(0, 1));
        assert_eq!(quote.expected_fee(&t).unwrap(), size.standard_bytes);
    }

    #[test]
    fn enough_and_not_enough() {
        let t = tx(1000, vec![p2pkh(900)]);
        let required = FeeQuote::default().expected_fee(&t).unwrap();
        assert!(required <= 100);
        assert!(t.is_fee_paid_enough(&FeeQuote::default()).unwrap());
        assert!(!t.is_fee_paid_enough(&FeeQuote::flat(10, 1)).unwrap());
    }

    #[test]
    fn outputs_above_inputs_is_not_enough() {
        let t = tx(100, vec![p2pkh(200)]);
        assert_eq!(t.fee_paid().unwrap(), None);
        assert!(!t.is_fee_paid_enough(&FeeQuote::flat(0, 1)).unwrap());
    }

    #[test]
    fn zero_byte_unit_is_an_error() {
        let t = tx(100, vec![p2pkh(50)]);
        assert_eq!(
            FeeQuote::flat(1, 0).expected_fee(&t),
            Err(TransactionError::ZeroFeeBytes)
        );
    }

    #[test]
    fn missing_previous_satoshis_is_an_error() {
        let mut t = tx(100, vec![p2pkh(50)]);
        t.inputs[0].previous_tx_satoshis = None;
        assert_eq!(
            t.is_fee_paid_enough(&FeeQuote::default()),
            Err(TransactionError::MissingPreviousSatoshis { vin: 0 })
        );
    }

    #[test]
    fn json_shape() {
        let quote: FeeQuote = serde_json::from_str(
            r#"{"standard":{"satoshis":50,"bytes":1000},"data":{"satoshis":25,"bytes":1000}}"#,
        )
        .unwrap();
        assert_eq!(quote.standard, FeeUnit::new(50, 1000));
        assert_eq!(quote.data, FeeUnit::new(25, 1000));
    }
}
