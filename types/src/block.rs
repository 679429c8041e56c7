//! Block hashes and 80-byte block headers.

use serde::{Deserialize, Serialize};

use crate::hash::display_hash;
use crate::{ByteReader, PaydError};

/// Serialized size of a block header.
pub const BLOCK_HEADER_LEN: usize = 80;

display_hash!(
    /// A 32-byte block hash (SHA-256d of the 80-byte header).
    BlockHash
);

/// A Bitcoin block header.
///
/// Only the merkle root matters for SPV; the remaining fields are kept so the
/// header can be re-serialized (and re-hashed) byte for byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block: BlockHash,
    /// Merkle root in internal byte order.
    #[serde(with = "hex_root")]
    pub merkle_root: [u8; 32],
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn from_bytes(b: &[u8]) -> Result<Self, PaydError> {
        if b.len() != BLOCK_HEADER_LEN {
            return Err(PaydError::InvalidLength {
                what: "block header",
                expected: BLOCK_HEADER_LEN,
                got: b.len(),
            });
        }
        let mut r = ByteReader::new(b);
        Ok(Self {
            version: r.read_u32_le()?,
            prev_block: BlockHash::new(r.read_array()?),
            merkle_root: r.read_array()?,
            time: r.read_u32_le()?,
            bits: r.read_u32_le()?,
            nonce: r.read_u32_le()?,
        })
    }

    pub fn from_hex(s: &str) -> Result<Self, PaydError> {
        Self::from_bytes(&hex::decode(s)?)
    }

    pub fn to_bytes(&self) -> [u8; BLOCK_HEADER_LEN] {
        let mut out = [0u8; BLOCK_HEADER_LEN];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(self.prev_block.as_bytes());
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.time.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

mod hex_root {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(root: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        let mut display = *root;
        display.reverse();
        s.serialize_str(&hex::encode(display))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let mut root = crate::hash::decode_hex_array::<32>("merkle root", &s)
            .map_err(serde::de::Error::custom)?;
        root.reverse();
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BlockHeader {
        BlockHeader {
            version: 0x2000_0000,
            prev_block: BlockHash::new([0x11; 32]),
            merkle_root: [0x22; 32],
            time: 1_631_000_000,
            bits: 0x1800_d0f6,
            nonce: 42,
        }
    }

    #[test]
    fn header_bytes_roundtrip() {
        let header = sample();
        let bytes = header.to_bytes();
        assert_eq!(BlockHeader::from_bytes(&bytes).unwrap(), header);
        assert_eq!(BlockHeader::from_hex(&header.to_hex()).unwrap(), header);
    }

    #[test]
    fn header_rejects_wrong_size() {
        assert!(matches!(
            BlockHeader::from_bytes(&[0u8; 79]),
            Err(PaydError::InvalidLength { expected: 80, got: 79, .. })
        ));
    }

    #[test]
    fn merkle_root_is_at_offset_36() {
        let bytes = sample().to_bytes();
        assert_eq!(&bytes[36..68], &[0x22; 32]);
    }
}
