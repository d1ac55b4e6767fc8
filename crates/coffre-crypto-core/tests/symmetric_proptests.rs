#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for the AES-256-CBC transform.

use coffre_crypto_core::symmetric::{decrypt, encrypt, Padding, BLOCK_LEN, KEY_LEN};
use proptest::prelude::*;

const PROP_KEY: [u8; KEY_LEN] = [0xCC; KEY_LEN];
const PROP_IV: [u8; BLOCK_LEN] = [0x0D; BLOCK_LEN];

proptest! {
    /// PKCS#7 encrypt→decrypt roundtrip for arbitrary plaintext.
    #[test]
    fn pkcs7_roundtrip(
        plaintext in proptest::collection::vec(any::<u8>(), 0..4096),
    ) {
        let ct = encrypt(&PROP_KEY, &PROP_IV, &plaintext, Padding::Pkcs7)
            .expect("encrypt should succeed");
        let pt = decrypt(&PROP_KEY, &PROP_IV, &ct, Padding::Pkcs7)
            .expect("decrypt should succeed");
        prop_assert_eq!(pt.expose(), plaintext.as_slice());
    }

    /// No-padding roundtrip preserves length exactly for whole blocks.
    #[test]
    fn no_padding_roundtrip_preserves_length(
        blocks in proptest::collection::vec(any::<[u8; BLOCK_LEN]>(), 0..64),
    ) {
        let plaintext: Vec<u8> = blocks.concat();
        let ct = encrypt(&PROP_KEY, &PROP_IV, &plaintext, Padding::None)
            .expect("encrypt should succeed");
        prop_assert_eq!(ct.len(), plaintext.len());
        let pt = decrypt(&PROP_KEY, &PROP_IV, &ct, Padding::None)
            .expect("decrypt should succeed");
        prop_assert_eq!(pt.expose(), plaintext.as_slice());
    }

    /// PKCS#7 ciphertext length is the next block boundary past the
    /// plaintext, always strictly larger.
    #[test]
    fn pkcs7_length_relation(
        plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let ct = encrypt(&PROP_KEY, &PROP_IV, &plaintext, Padding::Pkcs7)
            .expect("encrypt should succeed");
        prop_assert_eq!(ct.len(), (plaintext.len() / BLOCK_LEN + 1) * BLOCK_LEN);
        prop_assert!(ct.len() > plaintext.len());
    }

    /// Without a MAC a wrong key can slip past the padding check, but it
    /// can never reproduce the original plaintext.
    #[test]
    fn wrong_key_never_recovers_plaintext(
        plaintext in proptest::collection::vec(any::<u8>(), 1..512),
        wrong_key in any::<[u8; KEY_LEN]>(),
    ) {
        prop_assume!(wrong_key != PROP_KEY);
        let ct = encrypt(&PROP_KEY, &PROP_IV, &plaintext, Padding::Pkcs7)
            .expect("encrypt should succeed");
        match decrypt(&wrong_key, &PROP_IV, &ct, Padding::Pkcs7) {
            Ok(pt) => prop_assert_ne!(pt.expose(), plaintext.as_slice()),
            Err(_) => {}
        }
    }

    /// Ciphertext whose length is not a block multiple is always an
    /// integrity failure, for both padding disciplines.
    #[test]
    fn ragged_ciphertext_always_rejected(
        mut ct in proptest::collection::vec(any::<u8>(), 1..512),
    ) {
        if ct.len() % BLOCK_LEN == 0 {
            ct.push(0);
        }
        prop_assert!(decrypt(&PROP_KEY, &PROP_IV, &ct, Padding::Pkcs7).is_err());
        prop_assert!(decrypt(&PROP_KEY, &PROP_IV, &ct, Padding::None).is_err());
    }
}
