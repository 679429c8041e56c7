#![no_main]

use libfuzzer_sys::fuzz_target;
use payd_transactions::{FeeQuote, Transaction};

fuzz_target!(|data: &[u8]| {
    let Ok(tx) = Transaction::from_bytes(data) else {
        return;
    };
    assert_eq!(tx.to_bytes(), data, "decoding is exact");
    assert_eq!(tx.tx_id(), payd_crypto::hash_transaction(data));
    let _ = tx.is_fee_paid_enough(&FeeQuote::default());
});
