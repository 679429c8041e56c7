//! Bitcoin SV transactions as the SPV engine sees them.
//!
//! - **Transaction**: inputs, outputs and the legacy raw wire codec
//! - **Script**: opaque locking/unlocking script bytes with data-output detection
//! - **FeeQuote**: per-byte mining rates and the fee-sufficiency check

pub mod error;
pub mod fees;
pub mod script;
pub mod transaction;

pub use error::TransactionError;
pub use fees::{FeeQuote, FeeUnit, TxSize};
pub use script::Script;
pub use transaction::{Transaction, TxInput, TxOutput};
