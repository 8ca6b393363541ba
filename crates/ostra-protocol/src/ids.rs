//! Channel and message identifiers.
//!
//! Four identifier types appear on the wire:
//!
//! - [`ChannelId`]: 32 opaque bytes naming a channel. Doubles as the
//!   channel's symmetric sealing key, so it is treated as secret.
//! - [`MessageId`]: 48-bit big-endian counter, unique per channel and
//!   monotonically increasing per sender.
//! - [`MessageIdHash`]: 6-byte keyed digest published on the wire in
//!   place of the plaintext id.
//! - [`MessageHash`]: 16-byte digest of a full packet, used to reference
//!   prior messages.
//!
//! The digest types compare in constant time; matching an inbound
//! packet's id hash is an authentication-adjacent check.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use ostra_crypto::digest;

use crate::error::{ProtocolError, Result};
use crate::limits::{CHANNEL_ID_LEN, MSG_HASH_LEN, MSG_ID_HASH_LEN, MSG_ID_LEN, REFERENCE_LEN};

/// Domain separator fed to every message id hash.
pub const ID_HASH_DOMAIN: &[u8] = "ȱ id hash".as_bytes();

/// Domain separator fed to every message hash.
pub const MESSAGE_HASH_DOMAIN: &[u8] = "ȱ message hash".as_bytes();

/// A 32-byte channel identifier.
///
/// The id is also the channel's AEAD key, so it is never printed and is
/// zeroized on drop. Distribution of channel ids is up to the caller.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ChannelId([u8; CHANNEL_ID_LEN]);

impl ChannelId {
    /// Generate a fresh random channel id.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; CHANNEL_ID_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create a channel id from raw bytes.
    pub fn from_bytes(bytes: [u8; CHANNEL_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the id as a byte array.
    ///
    /// # Security
    ///
    /// These bytes are the channel's sealing key. Avoid logging them.
    pub fn as_bytes(&self) -> &[u8; CHANNEL_ID_LEN] {
        &self.0
    }
}

impl PartialEq for ChannelId {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for ChannelId {}

impl std::fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChannelId([REDACTED])")
    }
}

/// A 48-bit message id.
///
/// Ids order messages totally within a channel. The internal value never
/// exceeds 2^48 − 1; construction reduces modulo 2^48.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    /// The first id in a channel.
    pub const FIRST: Self = Self(0);

    /// Create an id from an integer, reduced modulo 2^48.
    pub fn new(value: u64) -> Self {
        Self(value & crate::varint::MAX)
    }

    /// The id following this one. Wraps at 2^48; callers are expected
    /// not to exhaust the counter.
    pub fn next(self) -> Self {
        Self::new(self.0.wrapping_add(1))
    }

    /// The id as an integer.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Big-endian wire encoding.
    pub fn to_bytes(self) -> [u8; MSG_ID_LEN] {
        let be = self.0.to_be_bytes();
        let mut out = [0u8; MSG_ID_LEN];
        out.copy_from_slice(&be[2..]);
        out
    }

    /// Decode from the big-endian wire encoding.
    pub fn from_bytes(bytes: [u8; MSG_ID_LEN]) -> Self {
        let mut be = [0u8; 8];
        be[2..].copy_from_slice(&bytes);
        Self(u64::from_be_bytes(be))
    }
}

impl std::fmt::Debug for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The 6-byte public identifier of a sealed packet.
///
/// Derived from the channel id and message id, so a receiver that
/// anticipates `(channel, id)` can match inbound packets without the
/// plaintext id ever appearing on the wire.
#[derive(Clone, Copy)]
pub struct MessageIdHash([u8; MSG_ID_HASH_LEN]);

impl MessageIdHash {
    /// Compute the id hash for `(channel, id)`.
    pub fn calculate(channel: &ChannelId, id: MessageId) -> Self {
        Self(digest(&[ID_HASH_DOMAIN, channel.as_bytes(), &id.to_bytes()]))
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; MSG_ID_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a byte array.
    pub fn as_bytes(&self) -> &[u8; MSG_ID_HASH_LEN] {
        &self.0
    }

    /// Format as hex.
    pub fn to_hex(&self) -> String {
        ostra_crypto::hash::to_hex(&self.0)
    }
}

impl ConstantTimeEq for MessageIdHash {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for MessageIdHash {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for MessageIdHash {}

impl std::fmt::Debug for MessageIdHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageIdHash({})", self.to_hex())
    }
}

/// The 16-byte digest of a sealed packet's full wire image.
#[derive(Clone, Copy, Default)]
pub struct MessageHash([u8; MSG_HASH_LEN]);

impl MessageHash {
    /// Compute the hash of a packet's wire image.
    pub fn calculate(message_bytes: &[u8]) -> Self {
        Self(digest(&[MESSAGE_HASH_DOMAIN, message_bytes]))
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; MSG_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a byte array.
    pub fn as_bytes(&self) -> &[u8; MSG_HASH_LEN] {
        &self.0
    }

    /// Format as hex.
    pub fn to_hex(&self) -> String {
        ostra_crypto::hash::to_hex(&self.0)
    }
}

impl ConstantTimeEq for MessageHash {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for MessageHash {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for MessageHash {}

impl std::fmt::Debug for MessageHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageHash({}..)", &self.to_hex()[..8])
    }
}

/// A reference to an earlier message in the same channel.
///
/// 22 bytes on the wire: the referenced message's id followed by its
/// hash. The all-zero reference is used where no referent exists (the
/// capability reference of a capability envelope itself, for example).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntraChannelReference {
    /// Id of the referenced message.
    pub id: MessageId,
    /// Hash of the referenced message's wire image.
    pub hash: MessageHash,
}

impl IntraChannelReference {
    /// Create a reference from its parts.
    pub fn new(id: MessageId, hash: MessageHash) -> Self {
        Self { id, hash }
    }

    /// Wire encoding: `id || hash`.
    pub fn to_bytes(&self) -> [u8; REFERENCE_LEN] {
        let mut out = [0u8; REFERENCE_LEN];
        out[..MSG_ID_LEN].copy_from_slice(&self.id.to_bytes());
        out[MSG_ID_LEN..].copy_from_slice(self.hash.as_bytes());
        out
    }

    /// Decode from the wire encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != REFERENCE_LEN {
            return Err(ProtocolError::InvalidLength {
                expected: REFERENCE_LEN,
                actual: bytes.len(),
            });
        }
        let mut id = [0u8; MSG_ID_LEN];
        id.copy_from_slice(&bytes[..MSG_ID_LEN]);
        let mut hash = [0u8; MSG_HASH_LEN];
        hash.copy_from_slice(&bytes[MSG_ID_LEN..]);
        Ok(Self {
            id: MessageId::from_bytes(id),
            hash: MessageHash::from_bytes(hash),
        })
    }
}
