//! Type-tagged, length-prefixed chunks: `tag(1) | len(varint) | payload`.
//!
//! An ancestry stream is a version byte followed by chunks. A mAPI list
//! payload nests its own records: `count(1) | count × (len(varint) | record)`.

use payd_types::{ByteReader, MapiCallback, PaydError, VarInt};

use crate::SpvError;

pub const TAG_TX: u8 = 1;
pub const TAG_PROOF: u8 = 2;
pub const TAG_MAPI_LIST: u8 = 3;

/// One decoded chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chunk {
    /// A raw transaction.
    Tx(Vec<u8>),
    /// A TSC binary merkle proof for the most recent transaction.
    Proof(Vec<u8>),
    /// mAPI callbacks for the most recent transaction.
    MapiList(Vec<MapiCallback>),
}

impl Chunk {
    pub fn tag(&self) -> u8 {
        match self {
            Chunk::Tx(_) => TAG_TX,
            Chunk::Proof(_) => TAG_PROOF,
            Chunk::MapiList(_) => TAG_MAPI_LIST,
        }
    }

    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<(), SpvError> {
        match self {
            Chunk::Tx(payload) | Chunk::Proof(payload) => encode_chunk(self.tag(), payload, buf),
            Chunk::MapiList(responses) => {
                let payload = encode_mapi_list(responses)?;
                encode_chunk(TAG_MAPI_LIST, &payload, buf);
            }
        }
        Ok(())
    }
}

/// Append `tag | varint(len) | payload` to `buf`.
pub fn encode_chunk(tag: u8, payload: &[u8], buf: &mut Vec<u8>) {
    buf.push(tag);
    VarInt::from(payload.len()).encode_into(buf);
    buf.extend_from_slice(payload);
}

/// Read the chunk starting at `offset`: `(tag, payload, bytes consumed)`.
pub fn decode_chunk(buf: &[u8], offset: usize) -> Result<(u8, &[u8], usize), SpvError> {
    let truncated = |reason: PaydError| SpvError::TruncatedChunk { offset, reason };
    let rest = buf.get(offset..).ok_or(truncated(PaydError::UnexpectedEof {
        needed: offset,
        available: buf.len(),
    }))?;
    let mut r = ByteReader::new(rest);

    let tag = r.read_u8().map_err(truncated)?;
    let payload = r.read_var_bytes().map_err(truncated)?;
    Ok((tag, payload, r.position()))
}

/// Encode a mAPI callback list payload. The list must hold 1 to 255 records.
pub fn encode_mapi_list(responses: &[MapiCallback]) -> Result<Vec<u8>, SpvError> {
    if responses.is_empty() {
        return Err(SpvError::ZeroMapiEntries);
    }
    let count =
        u8::try_from(responses.len()).map_err(|_| SpvError::TooManyMapiResponses(responses.len()))?;

    let mut buf = vec![count];
    for response in responses {
        let record = response.to_bytes()?;
        VarInt::from(record.len()).encode_into(&mut buf);
        buf.extend_from_slice(&record);
    }
    Ok(buf)
}

/// Decode a mAPI callback list payload. The leading count must match the records present.
pub fn decode_mapi_list(payload: &[u8]) -> Result<Vec<MapiCallback>, SpvError> {
    let (&count, records) = payload.split_first().ok_or(SpvError::ZeroMapiEntries)?;
    if count == 0 && records.is_empty() {
        return Err(SpvError::ZeroMapiEntries);
    }

    let mut r = ByteReader::new(records);
    let mut responses = Vec::with_capacity(usize::from(count));
    while !r.is_empty() {
        let record = r.read_var_bytes()?;
        responses.push(MapiCallback::from_bytes(record)?);
    }
    if responses.len() != usize::from(count) {
        return Err(SpvError::Malformed(format!(
            "mAPI list declares {count} records but holds {}",
            responses.len()
        )));
    }
    Ok(responses)
}

/// Iterates the chunks of a stream, skipping tags it does not know.
///
/// Stops after the first error.
pub struct ChunkReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ChunkReader<'a> {
    /// Read chunks from `buf`, starting at `offset`.
    pub fn new(buf: &'a [u8], offset: usize) -> Self {
        Self { buf, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for ChunkReader<'_> {
    type Item = Result<Chunk, SpvError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.offset < self.buf.len() {
            let (tag, payload, consumed) = match decode_chunk(self.buf, self.offset) {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.offset = self.buf.len();
                    return Some(Err(e));
                }
            };
            self.offset += consumed;

            let chunk = match tag {
                TAG_TX => Chunk::Tx(payload.to_vec()),
                TAG_PROOF => Chunk::Proof(payload.to_vec()),
                TAG_MAPI_LIST => match decode_mapi_list(payload) {
                    Ok(responses) => Chunk::MapiList(responses),
                    Err(e) => {
                        self.offset = self.buf.len();
                        return Some(Err(e));
                    }
                },
                other => {
                    tracing::trace!(tag = other, offset = self.offset, "skipping unknown chunk");
                    continue;
                }
            };
            return Some(Ok(chunk));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback(n: u64) -> MapiCallback {
        MapiCallback {
            api_version: "1.4.0".into(),
            block_height: n,
            callback_reason: "merkleProof".into(),
            ..Default::default()
        }
    }

    #[test]
    fn chunk_layout() {
        let mut buf = Vec::new();
        encode_chunk(TAG_TX, &[0xAA, 0xBB], &mut buf);
        assert_eq!(buf, vec![TAG_TX, 2, 0xAA, 0xBB]);
        assert_eq!(decode_chunk(&buf, 0).unwrap(), (TAG_TX, &[0xAA, 0xBB][..], 4));
    }

    #[test]
    fn long_payload_uses_wide_varint() {
        let payload = vec![7u8; 0x1_0000];
        let mut buf = Vec::new();
        encode_chunk(TAG_PROOF, &payload, &mut buf);
        assert_eq!(&buf[..6], &[TAG_PROOF, 0xfe, 0x00, 0x00, 0x01, 0x00]);
        let (tag, decoded, consumed) = decode_chunk(&buf, 0).unwrap();
        assert_eq!(tag, TAG_PROOF);
        assert_eq!(decoded, payload.as_slice());
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn decode_at_offset() {
        let mut buf = vec![0x01];
        encode_chunk(TAG_PROOF, b"abc", &mut buf);
        assert_eq!(decode_chunk(&buf, 1).unwrap(), (TAG_PROOF, &b"abc"[..], 5));
    }

    #[test]
    fn truncated_chunks_fail() {
        let mut buf = Vec::new();
        encode_chunk(TAG_TX, &[1, 2, 3, 4], &mut buf);
        for cut in 0..buf.len() {
            assert!(matches!(
                decode_chunk(&buf[..cut], 0),
                Err(SpvError::TruncatedChunk { offset: 0, .. })
            ));
        }
        assert!(decode_chunk(&buf, buf.len() + 1).is_err());
    }

    #[test]
    fn mapi_list_roundtrip_keeps_order() {
        let list = vec![callback(1), callback(2), callback(3)];
        let payload = encode_mapi_list(&list).unwrap();
        assert_eq!(payload[0], 3);
        assert_eq!(decode_mapi_list(&payload).unwrap(), list);
    }

    #[test]
    fn zero_mapi_entries_is_an_error() {
        assert_eq!(decode_mapi_list(&[]), Err(SpvError::ZeroMapiEntries));
        assert_eq!(decode_mapi_list(&[0]), Err(SpvError::ZeroMapiEntries));
        assert_eq!(encode_mapi_list(&[]), Err(SpvError::ZeroMapiEntries));
    }

    #[test]
    fn mapi_count_must_match_records() {
        let mut payload = encode_mapi_list(&[callback(1), callback(2)]).unwrap();
        payload[0] = 3;
        assert!(matches!(decode_mapi_list(&payload), Err(SpvError::Malformed(_))));
    }

    #[test]
    fn too_many_mapi_responses() {
        let list = vec![callback(0); 256];
        assert_eq!(
            encode_mapi_list(&list),
            Err(SpvError::TooManyMapiResponses(256))
        );
    }

    #[test]
    fn reader_skips_unknown_tags() {
        let mut buf = Vec::new();
        encode_chunk(TAG_TX, b"tx", &mut buf);
        encode_chunk(0x7f, b"future", &mut buf);
        Chunk::MapiList(vec![callback(9)]).encode_into(&mut buf).unwrap();

        let chunks: Vec<Chunk> = ChunkReader::new(&buf, 0).map(Result::unwrap).collect();
        assert_eq!(
            chunks,
            vec![Chunk::Tx(b"tx".to_vec()), Chunk::MapiList(vec![callback(9)])]
        );
    }

    #[test]
    fn reader_stops_after_an_error() {
        let mut buf = Vec::new();
        encode_chunk(TAG_TX, b"tx", &mut buf);
        buf.extend_from_slice(&[TAG_PROOF, 10, 1]);
        let mut reader = ChunkReader::new(&buf, 0);
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }
}
