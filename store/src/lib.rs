//! Abstract lookup traits for the payd SPV engine.
//!
//! The ancestry builder and the header-chain proof verifier only ever talk
//! to these traits. Backends (a SQL wallet store, a header service, the
//! in-memory nullables used in tests) implement them.

pub mod error;
pub mod header;
pub mod proof;
pub mod transaction;

pub use error::StoreError;
pub use header::BlockHeaderChain;
pub use proof::MerkleProofStore;
pub use transaction::TxStore;
