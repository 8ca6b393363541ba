//! # ostra-crypto
//!
//! Cryptographic primitives for the ostra messaging protocol.
//!
//! This crate provides the small set of operations the wire format needs:
//!
//! - **Hashing**: BLAKE3, truncated to the digest widths the packet
//!   layout fixes
//! - **Sealing**: XChaCha20-Poly1305 AEAD with a detached tag, operating
//!   in place on caller buffers
//! - **Signatures**: Ed25519 (32-byte keys, 64-byte signatures)
//!
//! ## Security
//!
//! Secret key material implements `Zeroize` and is cleared on drop.
//! `Debug` implementations never print key bytes. The sealing and
//! signing paths perform no heap allocation.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod error;
pub mod hash;
pub mod signing;

pub use error::{CryptoError, Result};
pub use hash::digest;
pub use signing::{PublicKey, Signature, SigningKeyPair, PUBLIC_KEY_SIZE, SIGNATURE_SIZE};

#[cfg(test)]
mod proptests;
