//! Fuzz target for reply-list iteration over hostile envelopes.
//!
//! A decrypted envelope's reply list is attacker-controlled; iterating
//! it must terminate without panicking for every byte pattern.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ostra_protocol::{Envelope, MessageId, ENVELOPE_SIZE};

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 + ENVELOPE_SIZE {
        return;
    }
    let own_id = MessageId::new(u64::from_be_bytes(data[..8].try_into().unwrap()));
    let mut bytes = [0u8; ENVELOPE_SIZE];
    bytes.copy_from_slice(&data[8..8 + ENVELOPE_SIZE]);

    let Ok(envelope) = Envelope::from_bytes(bytes) else {
        return;
    };

    let mut entries = 0usize;
    for item in envelope.iterate_reply_to(own_id) {
        match item {
            Ok(entry) => {
                assert!(entry.id.as_u64() < own_id.as_u64());
                entries += 1;
            }
            // Errors terminate the stream.
            Err(_) => break,
        }
    }
    // Each entry consumes at least 17 list bytes.
    assert!(entries <= envelope.in_reply_to_len() / 17);
});
