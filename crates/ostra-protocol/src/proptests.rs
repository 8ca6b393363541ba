//! Cross-module property tests.

use std::collections::BTreeSet;

use proptest::prelude::*;

use ostra_crypto::SigningKeyPair;

use crate::envelope::Envelope;
use crate::ids::{ChannelId, IntraChannelReference, MessageHash, MessageId};
use crate::limits::{MSG_HASH_LEN, VARYING_SPACE};
use crate::message::Message;
use crate::varint;

proptest! {
    #[test]
    fn varint_roundtrip(value in 0u64..=varint::MAX) {
        let mut buf = [0u8; varint::MAX_LEN];
        let written = varint::write(value, &mut buf);
        let (decoded, consumed) = varint::read(&buf[..written]).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, written);
    }

    #[test]
    fn varint_size_agrees_with_write(value in 0u64..=varint::MAX) {
        let mut buf = [0u8; varint::MAX_LEN];
        prop_assert_eq!(varint::size(value), varint::write(value, &mut buf));
    }

    #[test]
    fn varint_read_never_panics(input in any::<Vec<u8>>()) {
        let _ = varint::read(&input);
    }

    #[test]
    fn reply_graph_insert_iterate_set_equality(
        own in 1u64..=varint::MAX,
        ids in proptest::collection::btree_set(0u64..1_000_000, 0..12)
    ) {
        let own_id = MessageId::new(own);
        let entries: Vec<IntraChannelReference> = ids
            .iter()
            .filter(|&&id| id < own)
            .enumerate()
            .map(|(i, &id)| IntraChannelReference::new(
                MessageId::new(id),
                MessageHash::from_bytes([i as u8; MSG_HASH_LEN]),
            ))
            .collect();

        let mut envelope = Envelope::init(
            &IntraChannelReference::default(),
            &MessageHash::default(),
        );
        for entry in &entries {
            envelope.add_in_reply_to(own_id, entry).unwrap();
        }

        let decoded: Vec<IntraChannelReference> = envelope
            .iterate_reply_to(own_id)
            .collect::<crate::Result<_>>()
            .unwrap();

        // Exactly the inserted set, strictly decreasing by id.
        let inserted: BTreeSet<u64> = entries.iter().map(|e| e.id.as_u64()).collect();
        let recovered: BTreeSet<u64> = decoded.iter().map(|e| e.id.as_u64()).collect();
        prop_assert_eq!(recovered, inserted);
        for pair in decoded.windows(2) {
            prop_assert!(pair[0].id > pair[1].id);
        }
        for entry in &entries {
            let found = decoded.iter().find(|e| e.id == entry.id).unwrap();
            prop_assert_eq!(found.hash, entry.hash);
        }
        prop_assert_eq!(
            envelope.in_reply_to_len() + envelope.payload().len(),
            VARYING_SPACE
        );
    }

    #[test]
    fn reply_iteration_of_arbitrary_bytes_never_panics(
        own in 0u64..=varint::MAX,
        junk in proptest::collection::vec(any::<u8>(), 0..VARYING_SPACE)
    ) {
        let mut envelope = Envelope::init(
            &IntraChannelReference::default(),
            &MessageHash::default(),
        );
        envelope.payload_slice()[..junk.len()].copy_from_slice(&junk);
        // Mark the junk as reply-list bytes through the public header
        // path: rebuild from the raw image.
        let mut bytes = *envelope.as_bytes();
        bytes[0] = (bytes[0] & !0x01) | ((junk.len() >> 8) as u8 & 0x01);
        bytes[1] = junk.len() as u8;
        let envelope = Envelope::from_bytes(bytes).unwrap();

        for item in envelope.iterate_reply_to(MessageId::new(own)) {
            if item.is_err() {
                break;
            }
        }
    }

    #[test]
    fn seal_decrypt_roundtrip(
        channel_bytes in any::<[u8; 32]>(),
        id in 0u64..=varint::MAX,
        payload in proptest::collection::vec(any::<u8>(), 0..VARYING_SPACE)
    ) {
        let channel = ChannelId::from_bytes(channel_bytes);
        let keypair = SigningKeyPair::generate();

        let mut envelope = Envelope::init(
            &IntraChannelReference::default(),
            &MessageHash::default(),
        );
        envelope.payload_slice()[..payload.len()].copy_from_slice(&payload);
        envelope.sign(&keypair);

        let message = Message::init(&channel, MessageId::new(id), &envelope).unwrap();
        let opened = message.decrypt(&channel, MessageId::new(id)).unwrap();

        prop_assert_eq!(opened.as_bytes(), envelope.as_bytes());
        prop_assert!(opened.verify(&keypair.public_key()).is_ok());
    }

    #[test]
    fn decrypt_with_other_id_fails(
        id in 0u64..varint::MAX,
        other in 0u64..varint::MAX
    ) {
        prop_assume!(id != other);
        let channel = ChannelId::from_bytes([9u8; 32]);
        let envelope = Envelope::init(
            &IntraChannelReference::default(),
            &MessageHash::default(),
        );
        let message = Message::init(&channel, MessageId::new(id), &envelope).unwrap();
        prop_assert!(message.decrypt(&channel, MessageId::new(other)).is_err());
    }
}
