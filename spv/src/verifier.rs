//! Payment verification.
//!
//! Each ancestor is checked on its own against its direct parents, so the
//! order ancestors are visited in does not matter. The first failing check
//! aborts the whole verification.

use std::collections::BTreeMap;
use std::sync::Arc;

use payd_transactions::{FeeQuote, Transaction};
use payd_types::{MerkleProof, TxId};
use tracing::{debug, info};

use crate::merkle::claimed_tx_id;
use crate::{
    Ancestor, Ancestry, MerkleProofVerifier, ScriptVerifier, SpvError,
    UnimplementedScriptVerifier, VerifyOptions,
};

/// Accepts or rejects a payment given its claimed ancestry.
pub struct PaymentVerifier {
    proofs: Arc<dyn MerkleProofVerifier>,
    scripts: Arc<dyn ScriptVerifier>,
    opts: VerifyOptions,
}

impl PaymentVerifier {
    /// A verifier with default options and the permissive script hook.
    pub fn new(proofs: Arc<dyn MerkleProofVerifier>) -> Self {
        Self {
            proofs,
            scripts: Arc::new(UnimplementedScriptVerifier),
            opts: VerifyOptions::default(),
        }
    }

    pub fn with_script_verifier(mut self, scripts: Arc<dyn ScriptVerifier>) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn with_options(mut self, opts: VerifyOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.opts
    }

    /// Verify binary ancestry bytes with this verifier's options.
    pub async fn verify_payment(&self, ancestry: &[u8]) -> Result<Transaction, SpvError> {
        self.verify_payment_with(ancestry, &self.opts).await
    }

    /// Verify binary ancestry bytes with `opts`.
    ///
    /// Returns the payment tx. With fee checks on, its inputs carry the
    /// back-filled previous satoshi amounts.
    pub async fn verify_payment_with(
        &self,
        ancestry: &[u8],
        opts: &VerifyOptions,
    ) -> Result<Transaction, SpvError> {
        let fee_quote = opts.required_fee_quote()?;
        let ancestry = Ancestry::from_bytes(ancestry)?;
        self.verify_decoded(ancestry, opts, fee_quote).await
    }

    /// Verify an already decoded ancestry with `opts`.
    pub async fn verify_ancestry(
        &self,
        ancestry: Ancestry,
        opts: &VerifyOptions,
    ) -> Result<Transaction, SpvError> {
        let fee_quote = opts.required_fee_quote()?;
        self.verify_decoded(ancestry, opts, fee_quote).await
    }

    async fn verify_decoded(
        &self,
        ancestry: Ancestry,
        opts: &VerifyOptions,
        fee_quote: Option<&FeeQuote>,
    ) -> Result<Transaction, SpvError> {
        let payment_id = ancestry.payment_tx_id();
        let Ancestry {
            payment_tx,
            ancestors,
        } = ancestry;
        let mut all: BTreeMap<TxId, Ancestor> = ancestors;
        if all.contains_key(&payment_id) {
            return Err(SpvError::DuplicateAncestor { txid: payment_id });
        }
        all.insert(payment_id, Ancestor::new(payment_tx));

        let mut payment = None;
        for (id, ancestor) in &all {
            let checked = self.verify_ancestor(*id, ancestor, &all, opts, fee_quote).await?;
            if *id == payment_id {
                payment = Some(checked);
            }
        }

        info!(
            payment = %payment_id,
            ancestors = all.len() - 1,
            proofs = opts.proofs,
            script = opts.script,
            fees = opts.fees,
            "payment verified"
        );
        payment.ok_or(SpvError::MissingTipTx)
    }

    async fn verify_ancestor(
        &self,
        id: TxId,
        ancestor: &Ancestor,
        all: &BTreeMap<TxId, Ancestor>,
        opts: &VerifyOptions,
        fee_quote: Option<&FeeQuote>,
    ) -> Result<Transaction, SpvError> {
        let tx = &ancestor.tx;
        if tx.inputs.is_empty() {
            return Err(SpvError::NoTxInputsToVerify { txid: id });
        }

        if opts.proofs {
            self.check_proof(id, ancestor, all).await?;
        }
        if opts.script {
            self.check_scripts(id, tx, all)?;
        }
        match fee_quote {
            Some(quote) if !ancestor.is_anchored() => check_fees(id, tx, all, quote),
            _ => Ok(tx.clone()),
        }
    }

    async fn check_proof(
        &self,
        id: TxId,
        ancestor: &Ancestor,
        all: &BTreeMap<TxId, Ancestor>,
    ) -> Result<(), SpvError> {
        let Some(proof) = &ancestor.proof else {
            if let Some(missing) = ancestor.tx.parent_ids().into_iter().find(|p| !all.contains_key(p)) {
                return Err(SpvError::ProofOrInputMissing { txid: id, missing });
            }
            return Ok(());
        };

        let claimed = MerkleProof::from_bytes(proof)
            .and_then(|p| claimed_tx_id(&p))
            .map_err(|e| SpvError::InvalidProof {
                txid: id,
                reason: e.to_string(),
            })?;
        if claimed != id {
            return Err(SpvError::TxIdMismatch {
                expected: id,
                actual: claimed,
            });
        }

        let validation = match self.proofs.verify_merkle_proof(proof).await {
            Ok(validation) => validation,
            Err(e @ SpvError::Store { .. }) => return Err(e),
            Err(e) => {
                return Err(SpvError::InvalidProof {
                    txid: id,
                    reason: e.to_string(),
                })
            }
        };
        if validation.tx_id != id {
            return Err(SpvError::TxIdMismatch {
                expected: id,
                actual: validation.tx_id,
            });
        }
        if !validation.valid {
            return Err(SpvError::InvalidProof {
                txid: id,
                reason: "merkle proof does not reach its target".into(),
            });
        }
        debug!(txid = %id, block = ?validation.block_hash, "proof accepted");
        Ok(())
    }

    fn check_scripts(
        &self,
        id: TxId,
        tx: &Transaction,
        all: &BTreeMap<TxId, Ancestor>,
    ) -> Result<(), SpvError> {
        for (vin, input) in tx.inputs.iter().enumerate() {
            let Some(parent) = all.get(&input.previous_tx_id) else {
                continue;
            };
            let output = parent
                .tx
                .outputs
                .get(input.previous_tx_out_index as usize)
                .ok_or(SpvError::InputRefsOutOfBoundsOutput {
                    txid: id,
                    vin,
                    parent: input.previous_tx_id,
                    vout: input.previous_tx_out_index,
                })?;
            if !self
                .scripts
                .verify(tx, vin, &output.locking_script, &input.unlocking_script)
            {
                return Err(SpvError::PaymentNotVerified { txid: id, vin });
            }
        }
        Ok(())
    }
}

/// Back-fill previous output amounts on a copy of `tx` and check its fee.
fn check_fees(
    id: TxId,
    tx: &Transaction,
    all: &BTreeMap<TxId, Ancestor>,
    quote: &FeeQuote,
) -> Result<Transaction, SpvError> {
    let mut tx = tx.clone();
    for (vin, input) in tx.inputs.iter_mut().enumerate() {
        let parent = all
            .get(&input.previous_tx_id)
            .ok_or(SpvError::CannotCalculateFeePaid {
                txid: id,
                missing: input.previous_tx_id,
            })?;
        let output = parent
            .tx
            .outputs
            .get(input.previous_tx_out_index as usize)
            .ok_or(SpvError::InputRefsOutOfBoundsOutput {
                txid: id,
                vin,
                parent: input.previous_tx_id,
                vout: input.previous_tx_out_index,
            })?;
        input.previous_tx_satoshis = Some(output.satoshis);
    }

    if !tx.is_fee_paid_enough(quote)? {
        return Err(SpvError::FeePaidNotEnough {
            txid: id,
            paid: tx.fee_paid()?.unwrap_or(0),
            required: quote.expected_fee(&tx)?,
        });
    }
    debug!(txid = %id, "fee accepted");
    Ok(tx)
}
