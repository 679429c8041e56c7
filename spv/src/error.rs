use payd_store::StoreError;
use payd_transactions::TransactionError;
use payd_types::{PaydError, TxId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpvError {
    // structural
    #[error("provided tx {txid} has no inputs to build ancestry from")]
    NoTxInputs { txid: TxId },

    #[error("tx {txid} has no inputs to verify")]
    NoTxInputsToVerify { txid: TxId },

    #[error("truncated chunk at offset {offset}: {reason}")]
    TruncatedChunk { offset: usize, reason: PaydError },

    #[error("malformed ancestry: {0}")]
    Malformed(String),

    #[error("unsupported ancestry binary version {0}, only version 1 is supported")]
    UnsupportedVersion(u8),

    #[error("ancestry is empty")]
    EmptyAncestry,

    #[error("tried to parse zero mAPI entries")]
    ZeroMapiEntries,

    #[error("{0} mAPI responses do not fit a one-byte count")]
    TooManyMapiResponses(usize),

    #[error("ancestry must start with the payment tx")]
    MissingTipTx,

    #[error("tx {txid} appears more than once in the ancestry")]
    DuplicateAncestor { txid: TxId },

    // completeness
    #[error("break in the ancestry of {txid}: parent tx {missing} is missing and there is no proof")]
    ProofOrInputMissing { txid: TxId, missing: TxId },

    #[error("expected parent tx {txid} is missing")]
    NotAllInputsSupplied { txid: TxId },

    #[error("tx {txid} input {vin} refers to out of bounds output {vout} of {parent}")]
    InputRefsOutOfBoundsOutput {
        txid: TxId,
        vin: usize,
        parent: TxId,
        vout: u32,
    },

    #[error("cannot calculate fee paid by {txid}: parent tx {missing} not supplied")]
    CannotCalculateFeePaid { txid: TxId, missing: TxId },

    // integrity
    #[error("proof for {actual} is attached to tx {expected}")]
    TxIdMismatch { expected: TxId, actual: TxId },

    #[error("invalid merkle proof for tx {txid}: {reason}")]
    InvalidProof { txid: TxId, reason: String },

    #[error("tip transaction must be unconfirmed")]
    TipTxConfirmed,

    // policy
    #[error("not enough fees paid by {txid}: paid {paid}, required {required}")]
    FeePaidNotEnough { txid: TxId, paid: u64, required: u64 },

    #[error("fee check enabled but no fee quote supplied")]
    NoFeeQuoteSupplied,

    #[error("script verification failed for tx {txid} input {vin}")]
    PaymentNotVerified { txid: TxId, vin: usize },

    // collaborators
    #[error("could not find tx {txid}")]
    TxNotFound { txid: TxId },

    #[error("lookup for {txid} failed: {source}")]
    Store { txid: TxId, source: StoreError },

    #[error(transparent)]
    Types(#[from] PaydError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("json error: {0}")]
    Json(String),
}

impl SpvError {
    /// Whether the caller supplied a bad payment (as opposed to a collaborator failing).
    ///
    /// An HTTP layer maps `true` to a 4xx and `false` to a 5xx.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SpvError::Store { .. })
    }
}

impl From<serde_json::Error> for SpvError {
    fn from(e: serde_json::Error) -> Self {
        SpvError::Json(e.to_string())
    }
}
