#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for the PBKDF2 wrapper.

use coffre_crypto_core::kdf::{derive, HashAlg, Pbkdf2Params, SALT_LEN};
use proptest::prelude::*;

/// Cheap params — the fixed profiles are exercised by the KAT and
/// integration suites.
const PROP_PARAMS: Pbkdf2Params = Pbkdf2Params {
    iterations: 2,
    hash: HashAlg::Sha256,
};

proptest! {
    /// Output is always exactly the requested length.
    #[test]
    fn derive_honors_output_length(
        secret in proptest::collection::vec(any::<u8>(), 0..128),
        salt in any::<[u8; SALT_LEN]>(),
        out_len in 1usize..96,
    ) {
        let out = derive(&secret, &salt, &PROP_PARAMS, out_len)
            .expect("derive should succeed");
        prop_assert_eq!(out.len(), out_len);
    }

    /// Same inputs, same output — the derivation is deterministic.
    #[test]
    fn derive_is_deterministic(
        secret in proptest::collection::vec(any::<u8>(), 0..64),
        salt in any::<[u8; SALT_LEN]>(),
    ) {
        let a = derive(&secret, &salt, &PROP_PARAMS, 32).expect("derive should succeed");
        let b = derive(&secret, &salt, &PROP_PARAMS, 32).expect("derive should succeed");
        prop_assert_eq!(a.expose(), b.expose());
    }

    /// PBKDF2 output is prefix-stable: a longer request extends a shorter
    /// one byte-for-byte. The key/IV split in `derive_master_key_iv`
    /// relies on this.
    #[test]
    fn derive_is_prefix_stable(
        secret in proptest::collection::vec(any::<u8>(), 0..64),
        salt in any::<[u8; SALT_LEN]>(),
    ) {
        let short = derive(&secret, &salt, &PROP_PARAMS, 32).expect("derive should succeed");
        let long = derive(&secret, &salt, &PROP_PARAMS, 48).expect("derive should succeed");
        prop_assert_eq!(short.expose(), &long.expose()[..32]);
    }

    /// Two different salts never collide.
    #[test]
    fn different_salts_never_collide(
        secret in proptest::collection::vec(any::<u8>(), 1..64),
        salt_a in any::<[u8; SALT_LEN]>(),
        salt_b in any::<[u8; SALT_LEN]>(),
    ) {
        prop_assume!(salt_a != salt_b);
        let a = derive(&secret, &salt_a, &PROP_PARAMS, 32).expect("derive should succeed");
        let b = derive(&secret, &salt_b, &PROP_PARAMS, 32).expect("derive should succeed");
        prop_assert_ne!(a.expose(), b.expose());
    }

    /// A salt of any length other than 32 is a contract violation.
    #[test]
    fn wrong_salt_length_always_rejected(
        salt in proptest::collection::vec(any::<u8>(), 0..64)
            .prop_filter("must not be the contract length", |s| s.len() != SALT_LEN),
    ) {
        prop_assert!(derive(b"secret", &salt, &PROP_PARAMS, 32).is_err());
    }
}
