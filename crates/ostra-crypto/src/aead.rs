//! XChaCha20-Poly1305 sealing with a detached tag.
//!
//! The packet layout stores ciphertext and authentication tag in
//! separate fields of a fixed-size buffer, so both operations run in
//! place over a caller slice and the tag travels separately. Nothing
//! here allocates.
//!
//! ## Security Notes
//!
//! - NEVER reuse a nonce with the same key. The protocol derives the
//!   nonce from a per-channel monotonic counter, which satisfies this as
//!   long as the counter is not reused.
//! - The tag is verified before any plaintext is released.

use chacha20poly1305::{
    aead::AeadInPlace,
    KeyInit, Tag, XChaCha20Poly1305, XNonce,
};

use crate::{CryptoError, Result};

/// Size of the symmetric key in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Size of the nonce in bytes (192 bits for XChaCha20).
pub const NONCE_SIZE: usize = 24;

/// Size of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypt `buf` in place and return the detached authentication tag.
///
/// `aad` is authenticated but not encrypted.
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the cipher rejects the input.
pub fn seal_in_place_detached(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
    buf: &mut [u8],
) -> Result<[u8; TAG_SIZE]> {
    let cipher = XChaCha20Poly1305::new(key.into());
    let tag = cipher
        .encrypt_in_place_detached(XNonce::from_slice(nonce), aad, buf)
        .map_err(|_| CryptoError::Encryption("XChaCha20-Poly1305 sealing failed".into()))?;

    let mut out = [0u8; TAG_SIZE];
    out.copy_from_slice(tag.as_slice());
    Ok(out)
}

/// Verify `tag` and decrypt `buf` in place.
///
/// The same key, nonce, and `aad` used for sealing must be provided.
///
/// # Errors
///
/// Returns `CryptoError::Decryption` if the tag does not authenticate
/// the ciphertext under this key, nonce, and associated data. The
/// buffer is not decrypted in that case.
pub fn open_in_place_detached(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
    buf: &mut [u8],
    tag: &[u8; TAG_SIZE],
) -> Result<()> {
    let cipher = XChaCha20Poly1305::new(key.into());
    cipher
        .decrypt_in_place_detached(XNonce::from_slice(nonce), aad, buf, Tag::from_slice(tag))
        .map_err(|_| CryptoError::Decryption)
}
