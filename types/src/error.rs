//! Byte-level decoding errors shared across crates.

use thiserror::Error;

/// Common error type for decoding payd primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaydError {
    #[error("unexpected end of data: need {needed} bytes, have {available}")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid length for {what}: expected {expected}, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("varint {0} is not in its shortest form")]
    NonCanonicalVarInt(u64),

    #[error("length {0} does not fit in memory")]
    LengthOverflow(u64),

    #[error("{count} trailing bytes after {what}")]
    TrailingBytes { what: &'static str, count: usize },

    #[error("invalid flags used in merkle proof: {0:#04x}")]
    InvalidMerkleFlags(u8),

    #[error("invalid merkle proof node type: {0}")]
    InvalidNodeType(u8),

    #[error("invalid nodes")]
    InvalidNodes,

    #[error("missing txid in proof")]
    MissingTxIdInProof,

    #[error("missing target in proof")]
    MissingTargetInProof,

    #[error("json error: {0}")]
    Json(String),
}

impl From<hex::FromHexError> for PaydError {
    fn from(e: hex::FromHexError) -> Self {
        PaydError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for PaydError {
    fn from(e: serde_json::Error) -> Self {
        PaydError::Json(e.to_string())
    }
}
