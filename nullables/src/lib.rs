//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the SPV engine reads through (transactions, merkle
//! proofs, block headers) is abstracted behind a `payd-store` trait. This
//! crate provides test-friendly implementations that:
//! - Return exactly what the test put in
//! - Can be told to fail, to exercise collaborator error paths
//! - Never touch the filesystem or network
//!
//! [`NullBlock`] mines a fake block around a set of transactions so tests can
//! hand out merkle proofs that really fold to a known header.

pub mod block;
pub mod chain;
pub mod store;

pub use block::NullBlock;
pub use chain::NullHeaderChain;
pub use store::{NullMerkleProofStore, NullTxStore};
