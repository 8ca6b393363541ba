//! The plaintext, signed inner record of every packet.
//!
//! An envelope is exactly [`ENVELOPE_SIZE`] bytes with this layout:
//!
//! ```text
//! header (2) || authorization (22) || first_in_reply_to (16)
//! || variable (378) || signature (64)
//!
//! Header bits, bit 0 = most significant bit of byte 0:
//! - bit 0:      continuation (reserved; carried verbatim)
//! - bits 1-2:   payload_type (0 = authorization, 1 = payload,
//!               2 = encrypted payload; 3 is reserved)
//! - bits 3-6:   padding, must be zero
//! - bits 7-15:  n_in_reply_to_bytes (unsigned 9-bit)
//! ```
//!
//! The variable region is shared: the first `n_in_reply_to_bytes` hold
//! the encoded additional-parent list, the remainder is payload. The
//! list grows from the front and the payload shrinks to match, so
//! `n_in_reply_to_bytes + payload_len == 378` always.
//!
//! ## Reply-graph encoding
//!
//! Additional parents are stored sorted strictly decreasing by id, each
//! as `varint(delta) || hash` where `delta` is the gap down from the
//! previous entry's id. The base for the first entry is the envelope's
//! own id minus one, so replies clustered near the message encode in a
//! couple of bytes each. The immediate parent is not part of this list;
//! it has its own hash-only field.
//!
//! ## Signing
//!
//! The Ed25519 signature covers bytes `0..418`, everything before the
//! signature field itself.

use ostra_crypto::{PublicKey, SigningKeyPair};

use crate::error::{ProtocolError, Result};
use crate::ids::{IntraChannelReference, MessageHash, MessageId};
use crate::limits::{
    ED_SIG_LEN, ENVELOPE_SIZE, HEADER_LEN, MSG_HASH_LEN, REFERENCE_LEN, SIGNED_LEN, VARYING_SPACE,
};
use crate::varint;

const AUTH_OFFSET: usize = HEADER_LEN;
const FIRST_REPLY_OFFSET: usize = AUTH_OFFSET + REFERENCE_LEN;
const VARYING_OFFSET: usize = FIRST_REPLY_OFFSET + MSG_HASH_LEN;
const SIG_OFFSET: usize = VARYING_OFFSET + VARYING_SPACE;

const CONTINUATION_BIT: u8 = 0x80;
const PAYLOAD_TYPE_MASK: u8 = 0x60;
const PAYLOAD_TYPE_SHIFT: u32 = 5;
const HEADER_PADDING_MASK: u8 = 0x1E;
const REPLY_LEN_HIGH_BIT: u8 = 0x01;

const _: () = assert!(SIG_OFFSET == SIGNED_LEN);

/// What the payload region of an envelope carries.
///
/// `Authorization` and `EncryptedPayload` have no behavior in this
/// core; the bits are carried for the layer above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadType {
    /// The payload is a capability (public key plus conditions).
    Authorization = 0,
    /// The payload is plaintext application data.
    Payload = 1,
    /// The payload is application data encrypted end-to-end above this
    /// layer.
    EncryptedPayload = 2,
}

impl TryFrom<u8> for PayloadType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Authorization),
            1 => Ok(Self::Payload),
            2 => Ok(Self::EncryptedPayload),
            other => Err(ProtocolError::InvalidPayloadType(other)),
        }
    }
}

/// The fixed-size plaintext record inside every sealed packet.
///
/// Envelopes are built up (reply entries added, payload written), then
/// signed, then sealed. After sealing nothing mutates them; decrypted
/// envelopes are read-only.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    bytes: [u8; ENVELOPE_SIZE],
}

const _: () = assert!(std::mem::size_of::<Envelope>() == ENVELOPE_SIZE);

impl Envelope {
    /// Create an envelope with no additional parents, payload type
    /// [`PayloadType::Payload`], and a zeroed payload region.
    ///
    /// The caller writes the payload through [`payload_slice`]
    /// (after any [`add_in_reply_to`] calls) and must [`sign`] before
    /// sealing.
    ///
    /// [`payload_slice`]: Self::payload_slice
    /// [`add_in_reply_to`]: Self::add_in_reply_to
    /// [`sign`]: Self::sign
    pub fn init(authorization: &IntraChannelReference, first_in_reply_to: &MessageHash) -> Self {
        let mut bytes = [0u8; ENVELOPE_SIZE];
        bytes[AUTH_OFFSET..FIRST_REPLY_OFFSET].copy_from_slice(&authorization.to_bytes());
        bytes[FIRST_REPLY_OFFSET..VARYING_OFFSET].copy_from_slice(first_in_reply_to.as_bytes());
        let mut envelope = Self { bytes };
        envelope.set_payload_type(PayloadType::Payload);
        envelope
    }

    /// Reconstruct an envelope from its wire image, validating the
    /// header invariants.
    ///
    /// # Errors
    ///
    /// - `InvalidHeaderPadding` if the four reserved header bits are set
    /// - `InvalidPayloadType` if the payload type field holds 3
    /// - `InvalidLength` if the reply list length exceeds the variable
    ///   region
    pub fn from_bytes(bytes: [u8; ENVELOPE_SIZE]) -> Result<Self> {
        let envelope = Self { bytes };
        if envelope.bytes[0] & HEADER_PADDING_MASK != 0 {
            return Err(ProtocolError::InvalidHeaderPadding);
        }
        envelope.payload_type()?;
        if envelope.in_reply_to_len() > VARYING_SPACE {
            return Err(ProtocolError::InvalidLength {
                expected: VARYING_SPACE,
                actual: envelope.in_reply_to_len(),
            });
        }
        Ok(envelope)
    }

    /// The envelope's full byte image.
    pub fn as_bytes(&self) -> &[u8; ENVELOPE_SIZE] {
        &self.bytes
    }

    /// The reserved continuation bit, carried verbatim.
    pub fn continuation(&self) -> bool {
        self.bytes[0] & CONTINUATION_BIT != 0
    }

    /// Set the reserved continuation bit.
    pub fn set_continuation(&mut self, on: bool) {
        if on {
            self.bytes[0] |= CONTINUATION_BIT;
        } else {
            self.bytes[0] &= !CONTINUATION_BIT;
        }
    }

    /// What the payload region carries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayloadType` for the reserved bit pattern.
    pub fn payload_type(&self) -> Result<PayloadType> {
        PayloadType::try_from((self.bytes[0] & PAYLOAD_TYPE_MASK) >> PAYLOAD_TYPE_SHIFT)
    }

    /// Set the payload type, leaving every other header bit untouched.
    pub fn set_payload_type(&mut self, payload_type: PayloadType) {
        self.bytes[0] =
            (self.bytes[0] & !PAYLOAD_TYPE_MASK) | ((payload_type as u8) << PAYLOAD_TYPE_SHIFT);
    }

    /// Byte length of the encoded additional-parent list.
    pub fn in_reply_to_len(&self) -> usize {
        (((self.bytes[0] & REPLY_LEN_HIGH_BIT) as usize) << 8) | self.bytes[1] as usize
    }

    fn set_in_reply_to_len(&mut self, len: usize) {
        debug_assert!(len <= VARYING_SPACE);
        self.bytes[0] = (self.bytes[0] & !REPLY_LEN_HIGH_BIT) | ((len >> 8) as u8 & 0x01);
        self.bytes[1] = len as u8;
    }

    /// The reference to the capability envelope that authorizes this
    /// one.
    pub fn authorization(&self) -> IntraChannelReference {
        IntraChannelReference::from_bytes(&self.bytes[AUTH_OFFSET..FIRST_REPLY_OFFSET])
            .expect("field width matches reference length")
    }

    /// Hash of the immediate previous message this one replies to.
    pub fn first_in_reply_to(&self) -> MessageHash {
        let mut hash = [0u8; MSG_HASH_LEN];
        hash.copy_from_slice(&self.bytes[FIRST_REPLY_OFFSET..VARYING_OFFSET]);
        MessageHash::from_bytes(hash)
    }

    /// The payload region: everything in the variable region after the
    /// reply list. Shrinks as reply entries are added.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[VARYING_OFFSET + self.in_reply_to_len()..SIG_OFFSET]
    }

    /// Mutable view of the payload region.
    ///
    /// Add reply entries first: an insertion shifts the payload right
    /// and drops its tail bytes.
    pub fn payload_slice(&mut self) -> &mut [u8] {
        let start = VARYING_OFFSET + self.in_reply_to_len();
        &mut self.bytes[start..SIG_OFFSET]
    }

    /// The detached signature field.
    pub fn signature(&self) -> &[u8] {
        &self.bytes[SIG_OFFSET..]
    }

    /// Sign the envelope, writing the signature field.
    ///
    /// Covers bytes `0..418`; call after the header, reply list, and
    /// payload are final.
    pub fn sign(&mut self, keypair: &SigningKeyPair) {
        let signature = keypair.sign(&self.bytes[..SIG_OFFSET]);
        self.bytes[SIG_OFFSET..].copy_from_slice(&signature);
    }

    /// Verify the signature field against `public_key`.
    ///
    /// # Errors
    ///
    /// Returns `SignatureVerification` if the signature does not
    /// authenticate the envelope's signed prefix.
    pub fn verify(&self, public_key: &PublicKey) -> Result<()> {
        let mut signature = [0u8; ED_SIG_LEN];
        signature.copy_from_slice(&self.bytes[SIG_OFFSET..]);
        public_key
            .verify(&self.bytes[..SIG_OFFSET], &signature)
            .map_err(|_| ProtocolError::SignatureVerification)
    }

    /// Insert an additional parent into the reply list.
    ///
    /// The list stays sorted strictly decreasing by id. Capacity is
    /// checked before any byte is written; on `NoSpace` the envelope is
    /// unmodified. An insertion shifts the rest of the variable region
    /// right, so the last bytes of the payload region are dropped —
    /// build the reply list before writing the payload.
    ///
    /// # Errors
    ///
    /// - `ReplyIdOutOfOrder` if `entry.id` is not below `own_id`
    /// - `DuplicateReplyId` if an entry with this id is already stored
    /// - `NoSpace` if the insertion would exceed the variable region
    pub fn add_in_reply_to(
        &mut self,
        own_id: MessageId,
        entry: &IntraChannelReference,
    ) -> Result<()> {
        if entry.id >= own_id {
            return Err(ProtocolError::ReplyIdOutOfOrder {
                entry: entry.id,
                own: own_id,
            });
        }
        let n = self.in_reply_to_len();
        let target = entry.id.as_u64();

        // Scan for the insertion point: the first stored entry whose id
        // is below the new one, or the end of the list.
        let mut pos = 0usize;
        let mut prev = own_id.as_u64() - 1;
        // For a mid-list insertion, the varint at the cursor is
        // re-based from `prev - current` to `target - current`.
        let mut moved: Option<(usize, u64)> = None;
        {
            let list = &self.bytes[VARYING_OFFSET..VARYING_OFFSET + n];
            while pos < n {
                let (delta, varint_len) = varint::read(&list[pos..])?;
                let current = prev
                    .checked_sub(delta)
                    .ok_or(ProtocolError::ReplyIdUnderflow)?;
                if current == target {
                    return Err(ProtocolError::DuplicateReplyId(entry.id));
                }
                if current < target {
                    moved = Some((varint_len, current));
                    break;
                }
                prev = current;
                pos += varint_len + MSG_HASH_LEN;
            }
        }

        let new_varint_len = varint::size(prev - target);
        let (shrunk_len, growth) = match moved {
            Some((old_varint_len, current)) => {
                let rebased_len = varint::size(target - current);
                (
                    old_varint_len,
                    new_varint_len + MSG_HASH_LEN + rebased_len - old_varint_len,
                )
            }
            None => (0, new_varint_len + MSG_HASH_LEN),
        };
        if n + growth > VARYING_SPACE {
            return Err(ProtocolError::NoSpace {
                needed: growth,
                available: VARYING_SPACE - n,
            });
        }

        let varying = &mut self.bytes[VARYING_OFFSET..SIG_OFFSET];
        varying.copy_within(pos + shrunk_len..VARYING_SPACE - growth, pos + shrunk_len + growth);
        let mut cursor = pos;
        cursor += varint::write(prev - target, &mut varying[cursor..]);
        varying[cursor..cursor + MSG_HASH_LEN].copy_from_slice(entry.hash.as_bytes());
        cursor += MSG_HASH_LEN;
        if let Some((_, current)) = moved {
            varint::write(target - current, &mut varying[cursor..]);
        }
        self.set_in_reply_to_len(n + growth);
        Ok(())
    }

    /// Iterate the additional-parent list of an envelope whose own id
    /// is `own_id`.
    ///
    /// Entries come out in stored order, strictly decreasing by id. The
    /// iterator is single-pass; rebuild it to restart. A malformed list
    /// (truncated entry, varint error, or deltas that underflow the
    /// base id) yields one `Err` and then terminates.
    pub fn iterate_reply_to(&self, own_id: MessageId) -> ReplyToIter<'_> {
        let n = self.in_reply_to_len().min(VARYING_SPACE);
        ReplyToIter {
            rest: &self.bytes[VARYING_OFFSET..VARYING_OFFSET + n],
            prev: own_id.as_u64().checked_sub(1),
        }
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("continuation", &self.continuation())
            .field("payload_type", &self.payload_type())
            .field("in_reply_to_len", &self.in_reply_to_len())
            .field("first_in_reply_to", &self.first_in_reply_to())
            .finish()
    }
}

/// Lazy cursor over an envelope's additional-parent list.
///
/// Created by [`Envelope::iterate_reply_to`].
pub struct ReplyToIter<'a> {
    rest: &'a [u8],
    prev: Option<u64>,
}

impl Iterator for ReplyToIter<'_> {
    type Item = Result<IntraChannelReference>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        // A non-empty list under an envelope id of zero cannot decode.
        let Some(prev) = self.prev else {
            self.rest = &[];
            return Some(Err(ProtocolError::ReplyIdUnderflow));
        };
        let (delta, varint_len) = match varint::read(self.rest) {
            Ok(decoded) => decoded,
            Err(error) => {
                self.rest = &[];
                return Some(Err(error));
            }
        };
        let Some(id) = prev.checked_sub(delta) else {
            self.rest = &[];
            return Some(Err(ProtocolError::ReplyIdUnderflow));
        };
        let Some(hash_bytes) = self.rest.get(varint_len..varint_len + MSG_HASH_LEN) else {
            self.rest = &[];
            return Some(Err(ProtocolError::TruncatedReplyList));
        };
        let mut hash = [0u8; MSG_HASH_LEN];
        hash.copy_from_slice(hash_bytes);
        self.rest = &self.rest[varint_len + MSG_HASH_LEN..];
        self.prev = Some(id);
        Some(Ok(IntraChannelReference {
            id: MessageId::new(id),
            hash: MessageHash::from_bytes(hash),
        }))
    }
}
