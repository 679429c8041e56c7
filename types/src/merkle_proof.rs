//! TSC merkle proofs in their JSON and binary forms.
//!
//! Binary layout:
//!
//! ```text
//! flags(1) | index(varint) | [tx_len(varint) tx] or txid(32) | target | count(varint) | nodes
//! ```
//!
//! Flag bit 0 marks a full transaction instead of a txid. Bits 1-2 select the
//! target: a block hash (0), an 80-byte header (2) or a merkle root (4).
//! Bit 3 marks a tree (composite) proof, which is not supported. Each node is
//! a type byte followed by a 32-byte hash for type 0; type 1 is the `*`
//! duplicate marker and carries no payload.

use serde::{Deserialize, Serialize};

use crate::hash::{decode_hex_array, reverse_bytes};
use crate::{BlockHeader, ByteReader, PaydError, TxId, VarInt, BLOCK_HEADER_LEN};

const FLAG_TX: u8 = 0x01;
const TARGET_TYPE_MASK: u8 = 0x06;
const FLAG_TARGET_HEADER: u8 = 0x02;
const FLAG_TARGET_MERKLE_ROOT: u8 = 0x04;
const FLAG_TREE: u8 = 0x08;

const NODE_HASH: u8 = 0;
const NODE_DUPLICATE: u8 = 1;

/// Textual marker for a node that duplicates the running hash.
pub const DUPLICATE_NODE: &str = "*";

/// What the proof's `target` field identifies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetType {
    #[default]
    #[serde(alias = "blockhash", alias = "blockHash")]
    Hash,
    Header,
    MerkleRoot,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofType {
    #[default]
    Branch,
    Tree,
}

/// A merkle proof for one transaction in one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    /// Position of the transaction in the block.
    pub index: u64,
    /// Either a txid (64 hex chars) or the full raw transaction hex.
    pub tx_or_id: String,
    pub target: String,
    pub nodes: Vec<String>,
    #[serde(default)]
    pub target_type: TargetType,
    #[serde(default)]
    pub proof_type: ProofType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub composite: bool,
}

impl MerkleProof {
    /// Whether `tx_or_id` holds a full transaction rather than its id.
    pub fn carries_tx(&self) -> bool {
        self.tx_or_id.len() != 64
    }

    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.carries_tx() {
            flags |= FLAG_TX;
        }
        flags |= match self.target_type {
            TargetType::Hash => 0,
            TargetType::Header => FLAG_TARGET_HEADER,
            TargetType::MerkleRoot => FLAG_TARGET_MERKLE_ROOT,
        };
        if self.composite || self.proof_type == ProofType::Tree {
            flags |= FLAG_TREE;
        }
        flags
    }

    /// The txid when the proof carries an id, `None` when it carries a full tx.
    pub fn tx_id(&self) -> Result<Option<TxId>, PaydError> {
        if self.carries_tx() {
            return Ok(None);
        }
        TxId::from_hex(&self.tx_or_id).map(Some)
    }

    /// Raw transaction bytes when the proof carries a full tx.
    pub fn raw_tx(&self) -> Result<Option<Vec<u8>>, PaydError> {
        if !self.carries_tx() {
            return Ok(None);
        }
        if self.tx_or_id.is_empty() {
            return Err(PaydError::MissingTxIdInProof);
        }
        Ok(Some(hex::decode(&self.tx_or_id)?))
    }

    /// The target as a 32-byte hash in internal order (block hash or merkle root).
    pub fn target_hash(&self) -> Result<[u8; 32], PaydError> {
        let mut bytes = decode_hex_array::<32>("proof target", &self.target)?;
        bytes.reverse();
        Ok(bytes)
    }

    pub fn target_header(&self) -> Result<BlockHeader, PaydError> {
        BlockHeader::from_hex(&self.target)
    }

    /// Branch nodes in internal order; `None` marks a duplicate (`*`) node.
    pub fn node_hashes(&self) -> Result<Vec<Option<[u8; 32]>>, PaydError> {
        self.nodes
            .iter()
            .map(|node| {
                if node == DUPLICATE_NODE {
                    return Ok(None);
                }
                let mut bytes = decode_hex_array::<32>("proof node", node)?;
                bytes.reverse();
                Ok(Some(bytes))
            })
            .collect()
    }

    /// Serialize to the TSC binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PaydError> {
        let flags = self.flags();
        if flags & FLAG_TREE != 0 {
            return Err(PaydError::InvalidMerkleFlags(flags));
        }
        if self.tx_or_id.is_empty() {
            return Err(PaydError::MissingTxIdInProof);
        }
        if self.target.is_empty() {
            return Err(PaydError::MissingTargetInProof);
        }

        let mut buf = vec![flags];
        VarInt(self.index).encode_into(&mut buf);

        match self.raw_tx()? {
            Some(tx) => {
                VarInt::from(tx.len()).encode_into(&mut buf);
                buf.extend_from_slice(&tx);
            }
            None => buf.extend_from_slice(TxId::from_hex(&self.tx_or_id)?.as_bytes()),
        }

        match self.target_type {
            TargetType::Header => {
                let header = decode_hex_array::<BLOCK_HEADER_LEN>("proof target", &self.target)?;
                buf.extend_from_slice(&header);
            }
            TargetType::Hash | TargetType::MerkleRoot => {
                buf.extend_from_slice(&self.target_hash()?);
            }
        }

        VarInt::from(self.nodes.len()).encode_into(&mut buf);
        for node in self.node_hashes()? {
            match node {
                Some(hash) => {
                    buf.push(NODE_HASH);
                    buf.extend_from_slice(&hash);
                }
                None => buf.push(NODE_DUPLICATE),
            }
        }
        Ok(buf)
    }

    /// Parse the TSC binary form. Trailing bytes are rejected.
    pub fn from_bytes(b: &[u8]) -> Result<Self, PaydError> {
        let mut r = ByteReader::new(b);

        let flags = r.read_u8()?;
        let supported = FLAG_TX | TARGET_TYPE_MASK;
        if flags & !supported != 0 {
            return Err(PaydError::InvalidMerkleFlags(flags));
        }
        let target_type = match flags & TARGET_TYPE_MASK {
            0 => TargetType::Hash,
            FLAG_TARGET_HEADER => TargetType::Header,
            FLAG_TARGET_MERKLE_ROOT => TargetType::MerkleRoot,
            _ => return Err(PaydError::InvalidMerkleFlags(flags)),
        };

        let index = r.read_varint()?;

        let tx_or_id = if flags & FLAG_TX != 0 {
            let tx = r.read_var_bytes()?;
            if tx.is_empty() {
                return Err(PaydError::MissingTxIdInProof);
            }
            hex::encode(tx)
        } else {
            TxId::new(r.read_array()?).to_hex()
        };

        let target = match target_type {
            TargetType::Header => hex::encode(r.read_bytes(BLOCK_HEADER_LEN)?),
            TargetType::Hash | TargetType::MerkleRoot => {
                hex::encode(reverse_bytes(r.read_bytes(32)?))
            }
        };

        let count = r.read_varint()?;
        // every node takes at least one byte
        if count > r.remaining() as u64 {
            return Err(PaydError::UnexpectedEof {
                needed: usize::try_from(count).unwrap_or(usize::MAX),
                available: r.remaining(),
            });
        }
        let mut nodes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            match r.read_u8()? {
                NODE_HASH => nodes.push(hex::encode(reverse_bytes(r.read_bytes(32)?))),
                NODE_DUPLICATE => nodes.push(DUPLICATE_NODE.to_string()),
                other => return Err(PaydError::InvalidNodeType(other)),
            }
        }
        r.finish("merkle proof")?;

        Ok(Self {
            index,
            tx_or_id,
            target,
            nodes,
            target_type,
            proof_type: ProofType::Branch,
            composite: false,
        })
    }
}
