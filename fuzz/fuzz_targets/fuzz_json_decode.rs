#![no_main]

use libfuzzer_sys::fuzz_target;
use payd_spv::{AncestryJson, Envelope, TscAncestriesJson};

// JSON from untrusted peers: parsing and conversion into the graph must not panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(json) = serde_json::from_slice::<AncestryJson>(data) {
        let _ = json.to_ancestry();
    }
    if let Ok(tsc) = serde_json::from_slice::<TscAncestriesJson>(data) {
        let _ = tsc.to_bytes();
        let _ = tsc.to_nested();
    }
    if let Ok(envelope) = serde_json::from_slice::<Envelope>(data) {
        if let Ok(json) = AncestryJson::try_from(envelope) {
            let _ = json.to_ancestry();
        }
    }
});
