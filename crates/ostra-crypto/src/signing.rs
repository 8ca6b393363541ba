//! Ed25519 signing keys and verification.
//!
//! Wraps `ed25519-dalek` behind the small surface the protocol needs:
//! generate a keypair, sign a byte image, verify against a 32-byte
//! public key that may have arrived off the wire.
//!
//! ## Security Notes
//!
//! - The private key is zeroized on drop
//! - `Debug` never prints private key bytes
//! - Signing is deterministic (RFC 8032); verifiers do not depend on it

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

use crate::{CryptoError, Result};

/// Size of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// A detached Ed25519 signature.
pub type Signature = [u8; SIGNATURE_SIZE];

/// An Ed25519 keypair used to sign envelopes.
pub struct SigningKeyPair {
    // SigningKey zeroizes its secret on drop.
    inner: SigningKey,
}

impl SigningKeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::generate(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; PUBLIC_KEY_SIZE]) -> Self {
        Self {
            inner: SigningKey::from_bytes(seed),
        }
    }

    /// The public half of this keypair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.inner.verifying_key().to_bytes())
    }

    /// Sign `message`, returning the detached 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.inner.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("public_key", &self.public_key())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// An Ed25519 public key.
///
/// Holds raw bytes; point validity is checked on [`verify`](Self::verify)
/// so keys read from untrusted input can be carried around and compared
/// before any cryptographic use.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    /// Create a public key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; PUBLIC_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Get the key as a byte array.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Verify `signature` over `message`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SignatureVerification` if the key bytes do
    /// not decode to a valid curve point or the signature does not
    /// authenticate the message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        let key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::SignatureVerification)?;
        let sig = ed25519_dalek::Signature::from_bytes(signature);
        key.verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerification)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Public keys are not secret; show a truncated fingerprint.
        write!(f, "PublicKey({}..)", crate::hash::to_hex(&self.0[..4]))
    }
}
