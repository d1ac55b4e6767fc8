//! `coffre-crypto-core` — envelope-encryption core for COFFRE.
//!
//! This crate is the audit target: zero network, zero async, zero UI
//! dependencies. It implements the two-layer envelope that protects a
//! vault's credential payload:
//!
//! - **Outer layer** — a master-password-derived AES key wraps the
//!   112-byte inner key block (salt2 ‖ iv2 ‖ KGK).
//! - **Inner layer** — a key derived from the long-lived KGK encrypts the
//!   bulk payload.
//!
//! Changing the master password re-wraps 112 bytes and re-encrypts the
//! payload in a single ordinary pass — the KGK, and with it the vault's
//! key lineage, survives unchanged.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod rng;

pub mod kdf;
pub mod symmetric;

pub mod envelope;

pub use envelope::{decode, encode, encode_with, EEK_LEN, FORMAT_FLAG, HEADER_LEN, KGK_LEN};
pub use error::CryptoError;
pub use kdf::{
    derive, derive_blob_key, derive_master_key_iv, HashAlg, Pbkdf2Params, KGK_ITERATIONS,
    KGK_PARAMS, MASTER_ITERATIONS, MASTER_PARAMS, SALT_LEN,
};
pub use memory::{disable_core_dumps, SecureArray, SecureBuffer};
pub use rng::RandomSource;
pub use symmetric::{decrypt, encrypt, Padding, BLOCK_LEN, KEY_LEN};
