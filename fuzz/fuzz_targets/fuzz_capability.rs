//! Fuzz target for capability parsing.
//!
//! Condition lists arrive inside decrypted envelopes and are
//! attacker-controlled; parsing must never panic and padding
//! enforcement must hold for every input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ostra_protocol::{Authorization, MessageId};

fuzz_target!(|data: &[u8]| {
    let authorization = Authorization::new(data, MessageId::new(1));

    // Parsing arbitrary bytes must fail gracefully.
    let _ = authorization.public_key();
    if let Ok(conditions) = authorization.conditions() {
        // A successful parse means everything after the JSON value was
        // zero; every condition must then evaluate without panicking.
        for condition in &conditions {
            let _ = condition.check(MessageId::new(1), MessageId::new(u64::MAX >> 16));
        }
    }
});
