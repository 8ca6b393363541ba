//! Fuzz target for the reply-delta varint codec.
//!
//! Decoding arbitrary bytes must fail gracefully, and anything that
//! decodes must re-encode to a value the decoder accepts again.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ostra_protocol::varint;

fuzz_target!(|data: &[u8]| {
    // Never panic on arbitrary input.
    if let Ok((value, consumed)) = varint::read(data) {
        assert!(value <= varint::MAX);
        assert!(consumed <= varint::MAX_LEN);

        // The minimal re-encoding round-trips and is never longer
        // than what was consumed.
        let mut buf = [0u8; varint::MAX_LEN];
        let written = varint::write(value, &mut buf);
        assert!(written <= consumed);
        assert_eq!(varint::size(value), written);
        let (again, _) = varint::read(&buf[..written]).unwrap();
        assert_eq!(again, value);
    }
});
