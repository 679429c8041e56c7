#![no_main]

use libfuzzer_sys::fuzz_target;
use payd_types::MerkleProof;

fuzz_target!(|data: &[u8]| {
    let Ok(proof) = MerkleProof::from_bytes(data) else {
        return;
    };
    // Accessors on a decoded proof must not panic either.
    let _ = proof.tx_id();
    let _ = proof.target_hash();
    if let Ok(nodes) = proof.node_hashes() {
        if let Ok(Some(id)) = proof.tx_id() {
            let _ = payd_crypto::branch_root(*id.as_bytes(), proof.index, &nodes);
        }
    }
    let bytes = proof.to_bytes().expect("decoded proof re-encodes");
    assert_eq!(MerkleProof::from_bytes(&bytes).expect("re-encoded proof decodes"), proof);
});
