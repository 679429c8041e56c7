//! Bitcoin variable-length integers.
//!
//! Values below `0xfd` take one byte; larger values are prefixed with
//! `0xfd`, `0xfe` or `0xff` followed by a 2, 4 or 8 byte little-endian
//! integer. Encoding always picks the shortest form.

use crate::PaydError;

/// A Bitcoin varint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Number of bytes the encoded form takes.
    pub fn len(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Append the encoded form to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        match self.0 {
            0..=0xfc => buf.push(self.0 as u8),
            0xfd..=0xffff => {
                buf.push(0xfd);
                buf.extend_from_slice(&(self.0 as u16).to_le_bytes());
            }
            0x1_0000..=0xffff_ffff => {
                buf.push(0xfe);
                buf.extend_from_slice(&(self.0 as u32).to_le_bytes());
            }
            _ => {
                buf.push(0xff);
                buf.extend_from_slice(&self.0.to_le_bytes());
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());
        self.encode_into(&mut buf);
        buf
    }

    /// Decode a varint from the start of `b`, returning the value and the
    /// number of bytes it occupied. Only the shortest form is accepted.
    pub fn decode(b: &[u8]) -> Result<(u64, usize), PaydError> {
        let prefix = *b.first().ok_or(PaydError::UnexpectedEof {
            needed: 1,
            available: 0,
        })?;
        let width = match prefix {
            0xfd => 2,
            0xfe => 4,
            0xff => 8,
            n => return Ok((n as u64, 1)),
        };
        let body = b.get(1..1 + width).ok_or(PaydError::UnexpectedEof {
            needed: 1 + width,
            available: b.len(),
        })?;
        let mut le = [0u8; 8];
        le[..width].copy_from_slice(body);
        let value = u64::from_le_bytes(le);
        if VarInt(value).len() != 1 + width {
            return Err(PaydError::NonCanonicalVarInt(value));
        }
        Ok((value, 1 + width))
    }
}

impl From<usize> for VarInt {
    fn from(n: usize) -> Self {
        VarInt(n as u64)
    }
}
