use payd_types::PaydError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("failed to decode transaction: {0}")]
    Decode(#[from] PaydError),

    #[error("input {vin} has no previous output satoshis")]
    MissingPreviousSatoshis { vin: usize },

    #[error("fee unit must cover at least one byte")]
    ZeroFeeBytes,

    #[error("satoshi total overflowed")]
    SatoshiOverflow,
}
