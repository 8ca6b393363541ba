//! Cross-module property tests.

use proptest::prelude::*;

use crate::{aead, digest, SigningKeyPair};

proptest! {
    #[test]
    fn digest_deterministic(data in any::<Vec<u8>>()) {
        let a: [u8; 16] = digest(&[b"tag", &data]);
        let b: [u8; 16] = digest(&[b"tag", &data]);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn digest_widths_are_prefixes(data in any::<Vec<u8>>()) {
        let short: [u8; 6] = digest(&[&data]);
        let long: [u8; 16] = digest(&[&data]);
        prop_assert_eq!(&long[..6], &short[..]);
    }

    #[test]
    fn seal_open_roundtrip(
        key in any::<[u8; aead::KEY_SIZE]>(),
        nonce in any::<[u8; aead::NONCE_SIZE]>(),
        aad in any::<Vec<u8>>(),
        plaintext in any::<Vec<u8>>()
    ) {
        let mut buf = plaintext.clone();
        let tag = aead::seal_in_place_detached(&key, &nonce, &aad, &mut buf).unwrap();
        aead::open_in_place_detached(&key, &nonce, &aad, &mut buf, &tag).unwrap();
        prop_assert_eq!(buf, plaintext);
    }

    #[test]
    fn seal_rejects_any_flipped_bit(
        key in any::<[u8; aead::KEY_SIZE]>(),
        nonce in any::<[u8; aead::NONCE_SIZE]>(),
        plaintext in proptest::collection::vec(any::<u8>(), 1..64),
        bit in 0usize..8,
        idx in any::<proptest::sample::Index>()
    ) {
        let mut buf = plaintext;
        let tag = aead::seal_in_place_detached(&key, &nonce, b"", &mut buf).unwrap();
        let flip = idx.index(buf.len());
        buf[flip] ^= 1 << bit;
        prop_assert!(aead::open_in_place_detached(&key, &nonce, b"", &mut buf, &tag).is_err());
    }

    #[test]
    fn sign_verify_roundtrip(message in any::<Vec<u8>>()) {
        let keypair = SigningKeyPair::generate();
        let signature = keypair.sign(&message);
        prop_assert!(keypair.public_key().verify(&message, &signature).is_ok());
    }

    #[test]
    fn verify_fails_for_other_key(message in any::<Vec<u8>>()) {
        let keypair = SigningKeyPair::generate();
        let other = SigningKeyPair::generate();
        let signature = keypair.sign(&message);
        prop_assert!(other.public_key().verify(&message, &signature).is_err());
    }
}
