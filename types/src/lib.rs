//! Fundamental types for the payd SPV engine.
//!
//! This crate defines the byte-level building blocks shared by every other
//! crate in the workspace: transaction ids, block hashes and headers,
//! Bitcoin varints, TSC merkle proofs and mAPI callbacks.

pub mod block;
pub mod error;
pub mod hash;
pub mod mapi;
pub mod merkle_proof;
pub mod reader;
pub mod varint;

pub use block::{BlockHash, BlockHeader, BLOCK_HEADER_LEN};
pub use error::PaydError;
pub use hash::TxId;
pub use mapi::MapiCallback;
pub use merkle_proof::{MerkleProof, ProofType, TargetType, DUPLICATE_NODE};
pub use reader::ByteReader;
pub use varint::VarInt;
