//! Verification policy.

use payd_transactions::FeeQuote;
use serde::{Deserialize, Serialize};

use crate::SpvError;

/// Which checks the payment verifier runs.
///
/// Proofs and scripts are on by default; fees are off until a quote is supplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyOptions {
    pub proofs: bool,
    pub script: bool,
    pub fees: bool,
    pub fee_quote: Option<FeeQuote>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            proofs: true,
            script: true,
            fees: false,
            fee_quote: None,
        }
    }
}

impl VerifyOptions {
    pub fn verify_proofs(mut self) -> Self {
        self.proofs = true;
        self
    }

    pub fn no_verify_proofs(mut self) -> Self {
        self.proofs = false;
        self
    }

    pub fn verify_script(mut self) -> Self {
        self.script = true;
        self
    }

    pub fn no_verify_script(mut self) -> Self {
        self.script = false;
        self
    }

    /// Check fees against `quote`.
    pub fn verify_fees(mut self, quote: FeeQuote) -> Self {
        self.fees = true;
        self.fee_quote = Some(quote);
        self
    }

    pub fn no_verify_fees(mut self) -> Self {
        self.fees = false;
        self
    }

    /// Turn on proof and script checks together.
    pub fn verify_spv(self) -> Self {
        self.verify_proofs().verify_script()
    }

    /// Turn off proof and script checks together.
    pub fn no_verify_spv(self) -> Self {
        self.no_verify_proofs().no_verify_script()
    }

    /// The quote to check fees against, when fee checks are on.
    pub(crate) fn required_fee_quote(&self) -> Result<Option<&FeeQuote>, SpvError> {
        match (self.fees, &self.fee_quote) {
            (false, _) => Ok(None),
            (true, Some(quote)) => Ok(Some(quote)),
            (true, None) => Err(SpvError::NoFeeQuoteSupplied),
        }
    }
}
