#![no_main]

use libfuzzer_sys::fuzz_target;
use payd_spv::Ancestry;

// Decoding must never panic, and anything that decodes must re-encode to
// bytes that decode to the same graph.
fuzz_target!(|data: &[u8]| {
    let Ok(ancestry) = Ancestry::from_bytes(data) else {
        return;
    };
    let encoded = ancestry.to_bytes().expect("decoded ancestry re-encodes");
    let again = Ancestry::from_bytes(&encoded).expect("re-encoded ancestry decodes");
    assert_eq!(again, ancestry);
});
