//! Variable-length integer codec for reply-graph deltas.
//!
//! Big-endian, prefix-free encoding of unsigned 48-bit values. The
//! number of leading one bits in the first byte gives the number of
//! continuation bytes; the remaining bits of the first byte are the
//! high-order payload bits and continuation bytes carry the rest raw.
//!
//! ```text
//! 0xxxxxxx                                  7 bits, 1 byte
//! 10xxxxxx B                               14 bits, 2 bytes
//! 110xxxxx B B                             21 bits, 3 bytes
//! ...
//! 1111110x B B B B B B                     49 bits, 7 bytes
//! ```
//!
//! An `n`-byte encoding carries `7n` payload bits, so every value below
//! 2^48 fits in at most [`MAX_LEN`] bytes. The encoder always emits the
//! shortest form; the decoder accepts any form whose value fits in 48
//! bits, since both sides of the wire run this implementation.

use crate::error::{ProtocolError, Result};

/// Largest encodable value (2^48 − 1).
pub const MAX: u64 = (1 << 48) - 1;

/// Longest possible encoding in bytes.
pub const MAX_LEN: usize = 7;

/// Encoded length of `value` in bytes, without materializing the
/// encoding. Agrees with [`write`] for every value.
///
/// # Panics
///
/// Debug-asserts that `value` does not exceed [`MAX`].
pub fn size(value: u64) -> usize {
    debug_assert!(value <= MAX);
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Encode `value` into the front of `out`, returning the number of
/// bytes written.
///
/// # Panics
///
/// Panics if `out` is shorter than `size(value)`. Callers size the
/// destination with [`size`] first.
pub fn write(value: u64, out: &mut [u8]) -> usize {
    debug_assert!(value <= MAX);
    let len = size(value);
    if len == 1 {
        out[0] = value as u8;
        return 1;
    }
    let rest_bits = 8 * (len - 1);
    // len-1 leading ones, then a zero, then the high payload bits.
    let prefix = !(0xFFu8 >> (len - 1));
    out[0] = prefix | (value >> rest_bits) as u8;
    for i in 1..len {
        out[i] = (value >> (8 * (len - 1 - i))) as u8;
    }
    len
}

/// Decode a varint from the front of `input`, returning the value and
/// the number of bytes consumed.
///
/// # Errors
///
/// - `TruncatedVarint` if `input` is empty or shorter than the prefix
///   claims
/// - `MalformedVarint` if the prefix claims more than [`MAX_LEN`] bytes
///   or the decoded value exceeds [`MAX`]
pub fn read(input: &[u8]) -> Result<(u64, usize)> {
    let first = *input.first().ok_or(ProtocolError::TruncatedVarint)?;
    let len = first.leading_ones() as usize + 1;
    if len > MAX_LEN {
        return Err(ProtocolError::MalformedVarint);
    }
    if input.len() < len {
        return Err(ProtocolError::TruncatedVarint);
    }
    let mut value = (first & (0xFF >> len)) as u64;
    for &byte in &input[1..len] {
        value = (value << 8) | byte as u64;
    }
    if value > MAX {
        return Err(ProtocolError::MalformedVarint);
    }
    Ok((value, len))
}
