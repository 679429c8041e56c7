//! SHA-256d hashing for transactions and block headers.

use payd_types::{BlockHash, BlockHeader, TxId};
use sha2::{Digest, Sha256};

/// Single SHA-256 of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&Sha256::digest(data));
    output
}

/// SHA-256 applied twice. Output is in internal byte order.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// SHA-256d over several byte slices in sequence (avoids concatenation allocation).
pub fn sha256d_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let first = hasher.finalize();
    sha256(&first)
}

/// Hash a serialized transaction to produce its `TxId`.
pub fn hash_transaction(tx_bytes: &[u8]) -> TxId {
    TxId::new(sha256d(tx_bytes))
}

/// Hash an 80-byte header to produce its `BlockHash`.
pub fn hash_header(header: &BlockHeader) -> BlockHash {
    BlockHash::new(sha256d(&header.to_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_HEADER: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256d_known_vector() {
        assert_eq!(
            hex::encode(sha256d(b"hello")),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn sha256d_multi_equivalent() {
        let single = sha256d(b"helloworld");
        let multi = sha256d_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn genesis_header_hash() {
        let header = BlockHeader::from_hex(GENESIS_HEADER).unwrap();
        assert_eq!(
            hash_header(&header).to_hex(),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
    }

    #[test]
    fn genesis_coinbase_txid() {
        let tx = hex::decode(concat!(
            "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff",
            "4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72",
            "206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff",
            "0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f",
            "61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000"
        ))
        .unwrap();
        assert_eq!(
            hash_transaction(&tx).to_hex(),
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
        );
    }
}
