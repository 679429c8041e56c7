use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;

use payd_spv::chunk::{TAG_PROOF, TAG_TX};
use payd_spv::{
    encode_chunk, Ancestor, Ancestry, MerkleProofValidation, MerkleProofVerifier, PaymentVerifier,
    SpvError, VerifyOptions,
};
use payd_transactions::{FeeQuote, Script, Transaction, TxInput, TxOutput};
use payd_nullables::NullBlock;
use payd_types::{MapiCallback, MerkleProof, TxId};

/// Accepts any well-formed proof for the tx it names.
struct AcceptAll;

#[async_trait]
impl MerkleProofVerifier for AcceptAll {
    async fn verify_merkle_proof(&self, proof: &[u8]) -> Result<MerkleProofValidation, SpvError> {
        let proof = MerkleProof::from_bytes(proof)?;
        Ok(MerkleProofValidation {
            tx_id: proof.tx_id()?.ok_or(SpvError::Malformed("expected a txid proof".into()))?,
            valid: true,
            block_hash: None,
        })
    }
}

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(f)
}

fn spend(parents: &[(TxId, u32)], outputs: &[u64]) -> Transaction {
    Transaction {
        version: 1,
        inputs: parents
            .iter()
            .map(|&(id, vout)| TxInput {
                previous_tx_id: id,
                previous_tx_out_index: vout,
                unlocking_script: Script::new(vec![0x51]),
                sequence: u32::MAX,
                previous_tx_satoshis: None,
            })
            .collect(),
        outputs: outputs
            .iter()
            .map(|&satoshis| TxOutput {
                satoshis,
                locking_script: Script::new(vec![0x76, 0xa9]),
            })
            .collect(),
        lock_time: 0,
    }
}

fn mapi(n: usize) -> MapiCallback {
    MapiCallback {
        callback_payload: format!("payload {n}"),
        api_version: "1.4.0".into(),
        timestamp: "2021-01-01T00:00:00Z".into(),
        miner_id: "miner".into(),
        block_hash: String::new(),
        block_height: n as u64,
        callback_tx_id: String::new(),
        callback_reason: "merkleProof".into(),
    }
}

/// A chain of `depth` unconfirmed ancestors ending in an anchored one.
/// Amounts shrink by `fee` at every hop.
fn chain(depth: usize, fee: u64, mapi_count: usize) -> Ancestry {
    let anchor = spend(&[(TxId::new([0xAA; 32]), 0)], &[1_000_000]);
    let proof = NullBlock::mine(&[anchor.clone()], 0)
        .proof(&anchor.tx_id())
        .unwrap()
        .to_bytes()
        .unwrap();
    let mut ancestors = vec![Ancestor::new(anchor.clone())
        .with_proof(proof)
        .with_mapi_responses((0..mapi_count).map(mapi).collect())];

    let mut prev = anchor;
    let mut amount = 1_000_000;
    for _ in 0..depth {
        amount -= fee;
        let next = spend(&[(prev.tx_id(), 0)], &[amount]);
        ancestors.push(Ancestor::new(next.clone()));
        prev = next;
    }

    amount -= fee;
    let mut ancestry = Ancestry::new(spend(&[(prev.tx_id(), 0)], &[amount]));
    for ancestor in ancestors {
        ancestry.insert(ancestor).unwrap();
    }
    ancestry
}

proptest! {
    /// Decoding an encoded ancestry yields the same ancestor set.
    #[test]
    fn binary_roundtrip(depth in 0usize..6, fee in 1u64..500, mapi_count in 0usize..4) {
        let ancestry = chain(depth, fee, mapi_count);
        let decoded = Ancestry::from_bytes(&ancestry.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(decoded, ancestry);
    }

    /// Any first byte other than 1 is an unsupported version.
    #[test]
    fn version_gate(version in any::<u8>(), rest in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assume!(version != 1);
        let mut bytes = vec![version];
        bytes.extend(rest);
        prop_assert_eq!(Ancestry::from_bytes(&bytes), Err(SpvError::UnsupportedVersion(version)));
    }

    /// A proof chunk right after the payment tx is always a confirmed tip.
    #[test]
    fn proof_after_payment_is_tip_confirmed(
        proof in prop::collection::vec(any::<u8>(), 0..80),
        rest in prop::collection::vec(any::<u8>(), 0..40),
    ) {
        let payment = spend(&[(TxId::new([1; 32]), 0)], &[10]);
        let mut bytes = vec![1u8];
        encode_chunk(TAG_TX, &payment.to_bytes(), &mut bytes);
        encode_chunk(TAG_PROOF, &proof, &mut bytes);
        bytes.extend(rest);
        prop_assert_eq!(Ancestry::from_bytes(&bytes), Err(SpvError::TipTxConfirmed));
    }

    /// Decoding arbitrary bytes never panics.
    #[test]
    fn decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Ancestry::from_bytes(&data);
        let mut versioned = vec![1u8];
        versioned.extend(data);
        let _ = Ancestry::from_bytes(&versioned);
    }

    /// Removing any unconfirmed ancestor's parent breaks the ancestry.
    #[test]
    fn dangling_ancestor_is_always_missing_input(depth in 1usize..6, cut in 0usize..6) {
        let full = chain(depth, 10, 0);
        let verifier = PaymentVerifier::new(Arc::new(AcceptAll));
        prop_assert!(block_on(verifier.verify_ancestry(full.clone(), &VerifyOptions::default())).is_ok());

        // Drop one ancestor; whoever spent it is now dangling.
        let order = full.walk_order();
        let removed = order[cut % order.len()];
        let mut broken = full;
        broken.ancestors.remove(&removed);
        let err = block_on(verifier.verify_ancestry(broken, &VerifyOptions::default())).unwrap_err();
        let is_missing = matches!(err, SpvError::ProofOrInputMissing { missing, .. } if missing == removed);
        prop_assert!(is_missing);
    }

    /// If a payment passes a fee rate it passes every lower rate.
    #[test]
    fn fee_check_is_monotonic_in_rate(
        depth in 0usize..4,
        fee in 1u64..200,
        low in 0u64..20,
        extra in 0u64..20,
    ) {
        let ancestry = chain(depth, fee, 0);
        let verifier = PaymentVerifier::new(Arc::new(AcceptAll));
        let check = |sats: u64| {
            let opts = VerifyOptions::default().verify_fees(FeeQuote::flat(sats, 10));
            block_on(verifier.verify_ancestry(ancestry.clone(), &opts)).is_ok()
        };
        if check(low + extra) {
            prop_assert!(check(low));
        }
    }
}
