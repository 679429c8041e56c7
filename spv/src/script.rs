//! The script verification hook.

use payd_transactions::{Script, Transaction};

/// Decides whether an input's unlocking script satisfies the locking script
/// of the output it spends.
pub trait ScriptVerifier: Send + Sync {
    /// Whether input `vin` of `tx` (with `unlocking`) may spend an output locked by `locking`.
    fn verify(&self, tx: &Transaction, vin: usize, locking: &Script, unlocking: &Script) -> bool;

    fn name(&self) -> &str;
}

/// Accepts every input.
///
/// No script interpreter is wired in. With this verifier installed, script
/// level forgery is NOT caught; only the proof and fee checks are enforced.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnimplementedScriptVerifier;

impl ScriptVerifier for UnimplementedScriptVerifier {
    fn verify(&self, _tx: &Transaction, _vin: usize, _locking: &Script, _unlocking: &Script) -> bool {
        true
    }

    fn name(&self) -> &str {
        "unimplemented (accepts all scripts)"
    }
}
