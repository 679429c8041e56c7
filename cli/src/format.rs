//! Reading and writing ancestries in every supported form.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use payd_spv::{Ancestry, AncestryJson, Envelope, TscAncestriesJson};

/// The forms an ancestry can be read from or written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AncestryFormat {
    /// Version 1 binary.
    Bin,
    /// Version 1 binary as hex text.
    Hex,
    /// Nested JSON keyed by parent txid.
    Json,
    /// Flat TSC JSON list.
    Tsc,
    /// Legacy SPV envelope JSON.
    Envelope,
}

impl AncestryFormat {
    pub fn is_text(self) -> bool {
        !matches!(self, AncestryFormat::Bin)
    }
}

/// Read raw input from `path`, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Decode `input` as `format`.
pub fn decode(input: &[u8], format: AncestryFormat) -> anyhow::Result<Ancestry> {
    let ancestry = match format {
        AncestryFormat::Bin => Ancestry::from_bytes(input)?,
        AncestryFormat::Hex => {
            let text = std::str::from_utf8(input).context("hex input is not UTF-8")?;
            let bytes = hex::decode(text.trim()).context("input is not valid hex")?;
            Ancestry::from_bytes(&bytes)?
        }
        AncestryFormat::Json => {
            let json: AncestryJson = serde_json::from_slice(input).context("invalid ancestry JSON")?;
            json.to_ancestry()?
        }
        AncestryFormat::Tsc => {
            let tsc: TscAncestriesJson = serde_json::from_slice(input).context("invalid TSC ancestry JSON")?;
            Ancestry::from_bytes(&tsc.to_bytes()?)?
        }
        AncestryFormat::Envelope => {
            let envelope: Envelope = serde_json::from_slice(input).context("invalid envelope JSON")?;
            AncestryJson::try_from(envelope)?.to_ancestry()?
        }
    };
    Ok(ancestry)
}

/// Encode `ancestry` as `format`.
pub fn encode(ancestry: &Ancestry, format: AncestryFormat) -> anyhow::Result<Vec<u8>> {
    let out = match format {
        AncestryFormat::Bin => ancestry.to_bytes()?,
        AncestryFormat::Hex => hex::encode(ancestry.to_bytes()?).into_bytes(),
        AncestryFormat::Json => serde_json::to_vec_pretty(&AncestryJson::from_ancestry(ancestry)?)?,
        AncestryFormat::Tsc => serde_json::to_vec_pretty(&TscAncestriesJson::from_ancestry(ancestry)?)?,
        AncestryFormat::Envelope => {
            serde_json::to_vec_pretty(&Envelope::from(AncestryJson::from_ancestry(ancestry)?))?
        }
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use payd_spv::Ancestor;
    use payd_transactions::{Script, Transaction, TxInput, TxOutput};
    use payd_types::TxId;

    use super::*;

    fn spend(prev: TxId, satoshis: u64) -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TxInput {
                previous_tx_id: prev,
                previous_tx_out_index: 0,
                unlocking_script: Script::new(vec![0x51]),
                sequence: u32::MAX,
                previous_tx_satoshis: None,
            }],
            outputs: vec![TxOutput {
                satoshis,
                locking_script: Script::new(vec![0x76, 0xa9]),
            }],
            lock_time: 0,
        }
    }

    fn sample() -> Ancestry {
        let funding = spend(TxId::new([9; 32]), 1_000);
        let block = payd_nullables::NullBlock::mine(&[funding.clone()], 0);
        let proof = block.proof(&funding.tx_id()).unwrap().to_bytes().unwrap();
        let mut ancestry = Ancestry::new(spend(funding.tx_id(), 900));
        ancestry.insert(Ancestor::new(funding).with_proof(proof)).unwrap();
        ancestry
    }

    #[test]
    fn every_format_reads_back_what_it_wrote() {
        let ancestry = sample();
        for format in AncestryFormat::value_variants() {
            let bytes = encode(&ancestry, *format).unwrap();
            assert_eq!(decode(&bytes, *format).unwrap(), ancestry, "{format:?}");
        }
    }

    #[test]
    fn hex_input_tolerates_a_trailing_newline() {
        let ancestry = sample();
        let mut text = encode(&ancestry, AncestryFormat::Hex).unwrap();
        text.push(b'\n');
        assert_eq!(decode(&text, AncestryFormat::Hex).unwrap(), ancestry);
    }

    #[test]
    fn only_bin_is_binary() {
        assert!(!AncestryFormat::Bin.is_text());
        assert!(AncestryFormat::Tsc.is_text());
    }
}
