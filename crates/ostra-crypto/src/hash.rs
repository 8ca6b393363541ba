//! BLAKE3 hashing with truncated output.
//!
//! The wire format uses short digests (6 and 16 bytes) whose widths are
//! fixed by the packet layout. This module computes them by truncating
//! the BLAKE3 extended output; the first `N` bytes of the XOF stream are
//! a prefix of the standard 32-byte hash, so widening a digest type
//! never changes the bytes already on the wire.
//!
//! Inputs are fed to the hasher in order with no framing. Callers are
//! expected to pass a domain-separation tag as the first input; every
//! remaining input here is fixed-size, so the concatenation is
//! unambiguous.

/// Hash a sequence of inputs into an `N`-byte digest.
///
/// # Example
///
/// ```
/// use ostra_crypto::digest;
///
/// let short: [u8; 6] = digest(&[b"tag", b"data"]);
/// let long: [u8; 16] = digest(&[b"tag", b"data"]);
/// assert_eq!(&long[..6], &short[..]);
/// ```
pub fn digest<const N: usize>(inputs: &[&[u8]]) -> [u8; N] {
    let mut hasher = blake3::Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    let mut out = [0u8; N];
    hasher.finalize_xof().fill(&mut out);
    out
}

/// Format a digest as a lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        s.push_str(&format!("{:02x}", byte));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let a: [u8; 16] = digest(&[b"hello", b"world"]);
        let b: [u8; 16] = digest(&[b"hello", b"world"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_different_inputs_differ() {
        let a: [u8; 16] = digest(&[b"hello"]);
        let b: [u8; 16] = digest(&[b"world"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_digest_is_prefix_of_long() {
        let short: [u8; 6] = digest(&[b"tag", b"payload"]);
        let long: [u8; 32] = digest(&[b"tag", b"payload"]);
        assert_eq!(&long[..6], &short[..]);
    }

    #[test]
    fn test_standard_width_matches_plain_blake3() {
        let ours: [u8; 32] = digest(&[b"single input"]);
        let reference = blake3::hash(b"single input");
        assert_eq!(&ours, reference.as_bytes());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x00, 0xab, 0xff]), "00abff");
        assert_eq!(to_hex(&[]), "");
    }
}
