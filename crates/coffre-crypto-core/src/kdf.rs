//! PBKDF2 key derivation with fixed parameter profiles.
//!
//! This module provides:
//! - [`derive`] — PBKDF2-HMAC with an explicit [`Pbkdf2Params`] set
//! - [`derive_master_key_iv`] — master password → outer AES key + IV
//! - [`derive_blob_key`] — key generation key → bulk-payload key
//!
//! # Two Derivation Profiles
//!
//! The envelope scheme derives keys at two points with very different
//! threat models, and the iteration counts reflect that:
//!
//! - [`MASTER_PARAMS`] (32 768 × SHA-384, 48-byte output): the master
//!   password is the weakest link — a human-chosen secret — so the outer
//!   derivation is deliberately expensive. Hundreds of milliseconds per
//!   unlock is the intended brute-force cost.
//! - [`KGK_PARAMS`] (1 024 × SHA-256, 32-byte output): the KGK is 64
//!   random bytes and not guessable, so the inner derivation stays cheap.

use crate::error::CryptoError;
use crate::memory::{SecureArray, SecureBuffer};
use ring::pbkdf2;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use zeroize::Zeroize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Required salt length in bytes. Both derivation sites feed 32-byte salts
/// (the stored outer salt and the per-encode inner salt).
pub const SALT_LEN: usize = 32;

/// Iteration count for the master-password derivation.
pub const MASTER_ITERATIONS: u32 = 32_768;

/// Iteration count for the KGK-to-blob-key derivation.
pub const KGK_ITERATIONS: u32 = 1_024;

/// Outer AES-256 key length in bytes.
pub const MASTER_KEY_LEN: usize = 32;

/// Outer CBC initialization vector length in bytes.
pub const MASTER_IV_LEN: usize = 16;

/// Bulk-payload (blob) key length in bytes (AES-256).
pub const BLOB_KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Hash function selector for PBKDF2-HMAC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlg {
    /// HMAC-SHA-256 — the inner (KGK) profile.
    Sha256,
    /// HMAC-SHA-384 — the outer (master password) profile.
    Sha384,
}

impl HashAlg {
    fn algorithm(self) -> pbkdf2::Algorithm {
        match self {
            Self::Sha256 => pbkdf2::PBKDF2_HMAC_SHA256,
            Self::Sha384 => pbkdf2::PBKDF2_HMAC_SHA384,
        }
    }
}

/// PBKDF2 parameter set.
///
/// Serializable so that a vault layer can record which profile produced a
/// stored artifact; the envelope format itself carries no parameters — the
/// two profiles below are fixed by the scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pbkdf2Params {
    /// Number of PBKDF2 iterations. Must be non-zero.
    pub iterations: u32,
    /// HMAC hash function.
    pub hash: HashAlg,
}

/// Master-password profile: expensive on purpose.
pub const MASTER_PARAMS: Pbkdf2Params = Pbkdf2Params {
    iterations: MASTER_ITERATIONS,
    hash: HashAlg::Sha384,
};

/// KGK profile: the input is already high-entropy.
pub const KGK_PARAMS: Pbkdf2Params = Pbkdf2Params {
    iterations: KGK_ITERATIONS,
    hash: HashAlg::Sha256,
};

// ---------------------------------------------------------------------------
// Core KDF
// ---------------------------------------------------------------------------

/// Derive `out_len` bytes from `secret` and `salt` via PBKDF2-HMAC.
///
/// Deterministic: the same inputs always produce the same output. The
/// result is returned in a [`SecureBuffer`]; the intermediate buffer is
/// zeroized after the copy.
///
/// # Errors
///
/// Returns `CryptoError::ContractViolation` if the salt is not exactly
/// 32 bytes, the iteration count is zero, or `out_len` is zero. A
/// misconfigured KDF call is a caller bug, never a recoverable runtime
/// condition.
pub fn derive(
    secret: &[u8],
    salt: &[u8],
    params: &Pbkdf2Params,
    out_len: usize,
) -> Result<SecureBuffer, CryptoError> {
    if salt.len() != SALT_LEN {
        return Err(CryptoError::ContractViolation(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    let iterations = NonZeroU32::new(params.iterations).ok_or_else(|| {
        CryptoError::ContractViolation("iteration count must be non-zero".into())
    })?;
    if out_len == 0 {
        return Err(CryptoError::ContractViolation(
            "derived output length must be non-zero".into(),
        ));
    }

    let mut output = vec![0u8; out_len];
    pbkdf2::derive(params.hash.algorithm(), iterations, salt, secret, &mut output);

    let result = SecureBuffer::new(&output);
    output.zeroize();
    result
}

// ---------------------------------------------------------------------------
// Fixed call sites
// ---------------------------------------------------------------------------

/// Turn a master password into the outer (key, IV) pair.
///
/// One 48-byte [`MASTER_PARAMS`] derivation, split as key (bytes 0..32)
/// followed by IV (bytes 32..48).
///
/// # Errors
///
/// Returns `CryptoError::ContractViolation` if the salt is not 32 bytes.
pub fn derive_master_key_iv(
    password: &[u8],
    salt: &[u8],
) -> Result<(SecureArray<MASTER_KEY_LEN>, SecureArray<MASTER_IV_LEN>), CryptoError> {
    const COMBINED_LEN: usize = MASTER_KEY_LEN + MASTER_IV_LEN;

    let combined = derive(password, salt, &MASTER_PARAMS, COMBINED_LEN)?;

    let mut key = [0u8; MASTER_KEY_LEN];
    key.copy_from_slice(&combined.expose()[..MASTER_KEY_LEN]);
    let mut iv = [0u8; MASTER_IV_LEN];
    iv.copy_from_slice(&combined.expose()[MASTER_KEY_LEN..]);

    let pair = (SecureArray::new(key), SecureArray::new(iv));
    key.zeroize();
    iv.zeroize();
    Ok(pair)
}

/// Turn the key generation key into the bulk-payload key.
///
/// One 32-byte [`KGK_PARAMS`] derivation over the KGK and the per-encode
/// inner salt. Recomputed transiently on every encode/decode; never
/// persisted.
///
/// # Errors
///
/// Returns `CryptoError::ContractViolation` if the salt is not 32 bytes.
pub fn derive_blob_key(kgk: &[u8], salt: &[u8]) -> Result<SecureBuffer, CryptoError> {
    derive(kgk, salt, &KGK_PARAMS, BLOB_KEY_LEN)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
