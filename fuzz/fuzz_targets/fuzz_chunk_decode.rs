#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use payd_spv::chunk::{decode_mapi_list, TAG_PROOF, TAG_TX};
use payd_spv::{encode_chunk, Chunk, ChunkReader};

#[derive(Debug, Arbitrary)]
struct Input {
    raw: Vec<u8>,
    frames: Vec<(bool, Vec<u8>)>,
}

fuzz_target!(|input: Input| {
    // Arbitrary bytes: the reader stops at the first error without panicking.
    for chunk in ChunkReader::new(&input.raw, 0) {
        if chunk.is_err() {
            break;
        }
    }
    let _ = decode_mapi_list(&input.raw);

    // Well-formed frames come back out unchanged.
    let mut buf = Vec::new();
    for (is_tx, payload) in &input.frames {
        let tag = if *is_tx { TAG_TX } else { TAG_PROOF };
        encode_chunk(tag, payload, &mut buf);
    }
    let decoded: Vec<Chunk> = ChunkReader::new(&buf, 0)
        .collect::<Result<_, _>>()
        .expect("encoded frames decode");
    assert_eq!(decoded.len(), input.frames.len());
    for (chunk, (is_tx, payload)) in decoded.iter().zip(&input.frames) {
        match chunk {
            Chunk::Tx(p) => assert!(*is_tx && p == payload),
            Chunk::Proof(p) => assert!(!*is_tx && p == payload),
            Chunk::MapiList(_) => panic!("no mAPI frames were written"),
        }
    }
});
