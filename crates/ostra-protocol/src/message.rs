//! The sealed 504-byte wire packet.
//!
//! ```text
//! offset 0..6      MessageIdHash
//! offset 6..488    ciphertext (envelope)
//! offset 488..504  AEAD tag
//! ```
//!
//! Sealing binds an envelope to a `(channel, message id)` pair: the
//! channel id is the AEAD key and the message id, zero-padded, is the
//! nonce. Ids are monotonic per sender, so the key/nonce pair is never
//! reused within a channel. The leading id hash lets a receiver match
//! an anticipated `(channel, id)` without trial decryption; the AEAD
//! tag is the actual authentication.

use subtle::ConstantTimeEq;

use ostra_crypto::aead;

use crate::envelope::Envelope;
use crate::error::{ProtocolError, Result};
use crate::ids::{ChannelId, MessageHash, MessageId, MessageIdHash};
use crate::limits::{AUTH_TAG_LEN, CHANNEL_ID_LEN, ENVELOPE_SIZE, MSG_ID_HASH_LEN, MSG_ID_LEN, PACKET_SIZE};

/// Associated data authenticated with every sealed envelope.
pub const SEAL_DOMAIN: &[u8] = "ȱ message".as_bytes();

const ENC_OFFSET: usize = MSG_ID_HASH_LEN;
const TAG_OFFSET: usize = ENC_OFFSET + ENVELOPE_SIZE;

// The channel id is the AEAD key and the message id pads out to the
// nonce; the wire format only works if the widths line up.
const _: () = assert!(CHANNEL_ID_LEN == aead::KEY_SIZE);
const _: () = assert!(AUTH_TAG_LEN == aead::TAG_SIZE);
const _: () = assert!(MSG_ID_LEN <= aead::NONCE_SIZE);

/// A sealed packet, exactly [`PACKET_SIZE`] bytes.
///
/// Immutable once sealed; re-sealing a decrypted envelope produces a
/// fresh instance.
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    bytes: [u8; PACKET_SIZE],
}

const _: () = assert!(std::mem::size_of::<Message>() == PACKET_SIZE);

fn nonce_for(id: MessageId) -> [u8; aead::NONCE_SIZE] {
    let mut nonce = [0u8; aead::NONCE_SIZE];
    nonce[..MSG_ID_LEN].copy_from_slice(&id.to_bytes());
    nonce
}

impl Message {
    /// Seal `envelope` as message `id` of `channel`.
    ///
    /// The envelope should already be signed; sealing does not check
    /// the signature.
    ///
    /// # Errors
    ///
    /// Returns a `Crypto` error if the cipher rejects the input.
    pub fn init(channel: &ChannelId, id: MessageId, envelope: &Envelope) -> Result<Self> {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[..MSG_ID_HASH_LEN]
            .copy_from_slice(MessageIdHash::calculate(channel, id).as_bytes());
        bytes[ENC_OFFSET..TAG_OFFSET].copy_from_slice(envelope.as_bytes());
        let tag = aead::seal_in_place_detached(
            channel.as_bytes(),
            &nonce_for(id),
            SEAL_DOMAIN,
            &mut bytes[ENC_OFFSET..TAG_OFFSET],
        )?;
        bytes[TAG_OFFSET..].copy_from_slice(&tag);
        Ok(Self { bytes })
    }

    /// The packet's full wire image.
    pub fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.bytes
    }

    /// Reconstruct a packet from its wire image.
    ///
    /// Any 504 bytes are a candidate packet; authenticity is only
    /// established by [`decrypt`](Self::decrypt).
    pub fn from_bytes(bytes: [u8; PACKET_SIZE]) -> Self {
        Self { bytes }
    }

    /// The public id hash at the front of the packet.
    pub fn id_hash(&self) -> MessageIdHash {
        let mut hash = [0u8; MSG_ID_HASH_LEN];
        hash.copy_from_slice(&self.bytes[..MSG_ID_HASH_LEN]);
        MessageIdHash::from_bytes(hash)
    }

    /// Whether this packet's id hash matches an anticipated
    /// `(channel, id)` pair. Constant-time; a cheap pre-filter before
    /// [`decrypt`](Self::decrypt), not an authenticity check.
    pub fn matches(&self, channel: &ChannelId, id: MessageId) -> bool {
        self.id_hash()
            .ct_eq(&MessageIdHash::calculate(channel, id))
            .into()
    }

    /// Open the packet as message `id` of `channel`.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` if the tag rejects — tampering, a wrong
    ///   channel id, or a wrong message id are indistinguishable here
    /// - header validation errors from [`Envelope::from_bytes`] if the
    ///   plaintext is not a well-formed envelope
    pub fn decrypt(&self, channel: &ChannelId, id: MessageId) -> Result<Envelope> {
        let mut buf = [0u8; ENVELOPE_SIZE];
        buf.copy_from_slice(&self.bytes[ENC_OFFSET..TAG_OFFSET]);
        let mut tag = [0u8; AUTH_TAG_LEN];
        tag.copy_from_slice(&self.bytes[TAG_OFFSET..]);

        aead::open_in_place_detached(
            channel.as_bytes(),
            &nonce_for(id),
            SEAL_DOMAIN,
            &mut buf,
            &tag,
        )
        .map_err(|_| {
            tracing::debug!(id = %id, "packet failed authentication");
            ProtocolError::AuthenticationFailed
        })?;
        Envelope::from_bytes(buf)
    }

    /// Hash of the full 504-byte wire image, for referencing this
    /// message from later ones.
    pub fn hash(&self) -> MessageHash {
        MessageHash::calculate(&self.bytes)
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = ProtocolError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; PACKET_SIZE] =
            bytes
                .try_into()
                .map_err(|_| ProtocolError::InvalidLength {
                    expected: PACKET_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self::from_bytes(bytes))
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("id_hash", &self.id_hash())
            .field("hash", &self.hash())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostra_crypto::SigningKeyPair;

    use crate::ids::IntraChannelReference;

    fn test_envelope() -> Envelope {
        let keypair = SigningKeyPair::generate();
        let mut envelope = Envelope::init(
            &IntraChannelReference::default(),
            &MessageHash::from_bytes([7u8; 16]),
        );
        envelope.payload_slice().fill(0x55);
        envelope.sign(&keypair);
        envelope
    }

    #[test]
    fn test_seal_decrypt_roundtrip() {
        let channel = ChannelId::generate();
        let id = MessageId::new(42);
        let envelope = test_envelope();

        let message = Message::init(&channel, id, &envelope).unwrap();
        let opened = message.decrypt(&channel, id).unwrap();

        assert_eq!(opened.as_bytes(), envelope.as_bytes());
    }

    #[test]
    fn test_decrypt_fails_with_wrong_id() {
        let channel = ChannelId::generate();
        let message = Message::init(&channel, MessageId::new(42), &test_envelope()).unwrap();

        let result = message.decrypt(&channel, MessageId::new(43));
        assert!(matches!(result, Err(ProtocolError::AuthenticationFailed)));
    }

    #[test]
    fn test_decrypt_fails_with_wrong_channel() {
        let channel = ChannelId::generate();
        let other = ChannelId::generate();
        let id = MessageId::new(42);
        let message = Message::init(&channel, id, &test_envelope()).unwrap();

        let result = message.decrypt(&other, id);
        assert!(matches!(result, Err(ProtocolError::AuthenticationFailed)));
    }

    #[test]
    fn test_decrypt_fails_on_any_ciphertext_bit_flip() {
        let channel = ChannelId::generate();
        let id = MessageId::new(42);
        let message = Message::init(&channel, id, &test_envelope()).unwrap();

        for offset in [ENC_OFFSET, ENC_OFFSET + 100, TAG_OFFSET - 1] {
            let mut bytes = *message.as_bytes();
            bytes[offset] ^= 0x01;
            let tampered = Message::from_bytes(bytes);
            assert!(matches!(
                tampered.decrypt(&channel, id),
                Err(ProtocolError::AuthenticationFailed)
            ));
        }
    }

    #[test]
    fn test_decrypt_fails_on_tag_bit_flip() {
        let channel = ChannelId::generate();
        let id = MessageId::new(42);
        let message = Message::init(&channel, id, &test_envelope()).unwrap();

        let mut bytes = *message.as_bytes();
        bytes[PACKET_SIZE - 1] ^= 0x80;
        let tampered = Message::from_bytes(bytes);
        assert!(matches!(
            tampered.decrypt(&channel, id),
            Err(ProtocolError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_id_hash_matches_anticipated_pair() {
        let channel = ChannelId::generate();
        let id = MessageId::new(7);
        let message = Message::init(&channel, id, &test_envelope()).unwrap();

        assert_eq!(message.id_hash(), MessageIdHash::calculate(&channel, id));
        assert!(message.matches(&channel, id));
        assert!(!message.matches(&channel, MessageId::new(8)));
        assert!(!message.matches(&ChannelId::generate(), id));
    }

    #[test]
    fn test_id_hash_tamper_does_not_affect_decrypt() {
        // The id hash is a routing hint, not authenticated data.
        let channel = ChannelId::generate();
        let id = MessageId::new(7);
        let message = Message::init(&channel, id, &test_envelope()).unwrap();

        let mut bytes = *message.as_bytes();
        bytes[0] ^= 0xFF;
        let tampered = Message::from_bytes(bytes);
        assert!(tampered.decrypt(&channel, id).is_ok());
        assert!(!tampered.matches(&channel, id));
    }

    #[test]
    fn test_wire_image_roundtrip() {
        let channel = ChannelId::generate();
        let id = MessageId::new(9);
        let message = Message::init(&channel, id, &test_envelope()).unwrap();

        let restored = Message::try_from(&message.as_bytes()[..]).unwrap();
        assert_eq!(restored, message);
        assert_eq!(restored.hash(), message.hash());
    }

    #[test]
    fn test_try_from_rejects_wrong_length() {
        let result = Message::try_from(&[0u8; PACKET_SIZE - 1][..]);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidLength { expected: PACKET_SIZE, actual }) if actual == PACKET_SIZE - 1
        ));
    }

    #[test]
    fn test_hash_covers_whole_wire_image() {
        let channel = ChannelId::generate();
        let message = Message::init(&channel, MessageId::new(1), &test_envelope()).unwrap();

        let mut bytes = *message.as_bytes();
        bytes[0] ^= 0x01;
        assert_ne!(Message::from_bytes(bytes).hash(), message.hash());
    }

    #[test]
    fn test_sealing_is_deterministic_per_channel_and_id() {
        // Same envelope, channel, and id give the same packet; the
        // nonce is the id, not random.
        let channel = ChannelId::generate();
        let id = MessageId::new(3);
        let envelope = test_envelope();

        let a = Message::init(&channel, id, &envelope).unwrap();
        let b = Message::init(&channel, id, &envelope).unwrap();
        assert_eq!(a, b);
    }
}
