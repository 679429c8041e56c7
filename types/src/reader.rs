//! A bounds-checked cursor over a byte slice.
//!
//! Every read either returns the requested bytes or an
//! [`PaydError::UnexpectedEof`]; nothing in here can panic on
//! attacker-controlled input.

use crate::{PaydError, VarInt};

/// Forward-only reader over borrowed bytes.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PaydError> {
        if n > self.remaining() {
            return Err(PaydError::UnexpectedEof {
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PaydError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, PaydError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32, PaydError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, PaydError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_varint(&mut self) -> Result<u64, PaydError> {
        let (value, width) = VarInt::decode(&self.buf[self.pos..])?;
        self.pos += width;
        Ok(value)
    }

    /// Read a varint used as a length and make sure that many bytes remain.
    pub fn read_len(&mut self) -> Result<usize, PaydError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| PaydError::LengthOverflow(len))?;
        if len > self.remaining() {
            return Err(PaydError::UnexpectedEof {
                needed: len,
                available: self.remaining(),
            });
        }
        Ok(len)
    }

    /// Read a varint length prefix followed by that many bytes.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], PaydError> {
        let len = self.read_len()?;
        self.read_bytes(len)
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(&self, what: &'static str) -> Result<(), PaydError> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(PaydError::TrailingBytes { what, count }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = [1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u32_le().unwrap(), 1);
        assert_eq!(r.read_u64_le().unwrap(), 2);
        assert!(r.is_empty());
        assert!(r.finish("test").is_ok());
    }

    #[test]
    fn read_len_checks_remaining() {
        let data = [0x05, 1, 2];
        let mut r = ByteReader::new(&data);
        assert!(matches!(
            r.read_len(),
            Err(PaydError::UnexpectedEof { needed: 5, available: 2 })
        ));
    }

    #[test]
    fn var_bytes_roundtrip() {
        let data = [0x03, 9, 8, 7, 0xee];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_var_bytes().unwrap(), &[9, 8, 7]);
        assert_eq!(r.position(), 4);
        assert!(matches!(
            r.finish("var bytes"),
            Err(PaydError::TrailingBytes { count: 1, .. })
        ));
    }
}
