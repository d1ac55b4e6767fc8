//! Envelope codec — the single encrypted artifact COFFRE persists.
//!
//! This module provides:
//! - [`encode`] / [`encode_with`] — wrap a payload and the KGK into an envelope
//! - [`decode`] — recover payload + KGK from an envelope and the master password
//!
//! # Envelope Layout
//!
//! ```text
//! Flag (1 B, 0x01) | Outer salt (32 B) | EEK (112 B) | Cipher payload (n × 16 B)
//! ```
//!
//! The EEK (encrypted envelope key) is the CBC/no-padding encryption of
//! `salt2 (32) ‖ iv2 (16) ‖ KGK (64)` under the master-password-derived
//! outer key and IV.
//!
//! # Two-Layer Key Model
//!
//! The KGK (key generation key) is a 64-byte secret generated once per
//! vault. The bulk payload is never encrypted under the password-derived
//! key — it is encrypted under a key derived from the KGK and a fresh
//! per-encode salt. A master-password change therefore decodes with the
//! old password and re-encodes with the new outer key but the *same* KGK:
//! only the 112-byte inner block is re-wrapped, the payload cost is one
//! ordinary encode regardless of vault size.
//!
//! Salt2 and IV2 are regenerated on every encode, so re-wrapping the same
//! KGK always produces a fresh EEK and a fresh payload ciphertext.
//!
//! # No Authentication Tag
//!
//! The scheme is CBC without a MAC. Tampering is only caught
//! opportunistically by the fixed-length check on the inner block and the
//! PKCS#7 validation on the payload. This is an inherited limitation of
//! the envelope format; an AEAD upgrade would break the on-wire layout
//! and is deliberately not attempted here.

use crate::error::CryptoError;
use crate::kdf;
use crate::memory::{SecureArray, SecureBuffer};
use crate::rng::RandomSource;
use crate::symmetric::{self, Padding, BLOCK_LEN, KEY_LEN};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use rand::rngs::OsRng;
use std::io::{Read, Write};
use zeroize::{Zeroize, Zeroizing};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The one recognized format flag. Any other leading byte is a hard
/// decode failure.
pub const FORMAT_FLAG: u8 = 0x01;

/// Salt length in bytes — outer (stored) and inner (wrapped) alike.
pub use crate::kdf::SALT_LEN;

/// Key generation key length in bytes.
pub const KGK_LEN: usize = 64;

/// Encrypted envelope key length: salt2 + iv2 + KGK, before and after
/// the no-padding cipher pass.
pub const EEK_LEN: usize = SALT_LEN + BLOCK_LEN + KGK_LEN;

/// Fixed envelope header: flag + outer salt + EEK.
pub const HEADER_LEN: usize = 1 + SALT_LEN + EEK_LEN;

/// End of the outer salt field.
const SALT_END: usize = 1 + SALT_LEN;

/// End of the EEK field (equals [`HEADER_LEN`]).
const EEK_END: usize = SALT_END + EEK_LEN;

/// Offset of IV2 inside the decrypted inner block.
const INNER_IV2_END: usize = SALT_LEN + BLOCK_LEN;

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encode with the process CSPRNG. See [`encode_with`].
///
/// # Errors
///
/// Same as [`encode_with`].
pub fn encode(
    outer_key: &[u8],
    outer_iv: &[u8],
    outer_salt: &[u8],
    kgk: &SecureArray<KGK_LEN>,
    payload: &[u8],
    compress: bool,
) -> Result<Vec<u8>, CryptoError> {
    encode_with(outer_key, outer_iv, outer_salt, kgk, payload, compress, &mut OsRng)
}

/// Wrap `payload` and the KGK into a fresh envelope.
///
/// `outer_key` and `outer_iv` come from [`kdf::derive_master_key_iv`];
/// `outer_salt` is the stable per-vault salt that derivation used, stored
/// verbatim so the envelope is self-describing. The KGK is re-wrapped,
/// never regenerated — pass the same KGK across encodes (and across
/// master-password changes) and [`decode`] will keep recovering it.
///
/// With `compress`, the payload is deflated *before* encryption; the
/// reverse order would compress ciphertext, which is pointless.
///
/// # Errors
///
/// Returns `CryptoError::ContractViolation` if `outer_key` is not 32
/// bytes, `outer_iv` not 16, or `outer_salt` not 32. The KGK length is
/// enforced by its type. Returns `CryptoError::SecureMemory` if the
/// random source fails, `CryptoError::Encryption` on cipher or
/// compression stream failure.
pub fn encode_with(
    outer_key: &[u8],
    outer_iv: &[u8],
    outer_salt: &[u8],
    kgk: &SecureArray<KGK_LEN>,
    payload: &[u8],
    compress: bool,
    rng: &mut dyn RandomSource,
) -> Result<Vec<u8>, CryptoError> {
    if outer_key.len() != KEY_LEN {
        return Err(CryptoError::ContractViolation(format!(
            "outer key must be {KEY_LEN} bytes, got {}",
            outer_key.len()
        )));
    }
    if outer_iv.len() != BLOCK_LEN {
        return Err(CryptoError::ContractViolation(format!(
            "outer IV must be {BLOCK_LEN} bytes, got {}",
            outer_iv.len()
        )));
    }
    if outer_salt.len() != SALT_LEN {
        return Err(CryptoError::ContractViolation(format!(
            "outer salt must be {SALT_LEN} bytes, got {}",
            outer_salt.len()
        )));
    }

    // Fresh inner randomness on every encode — the KGK itself never
    // changes, only its wrapping.
    let mut salt2 = [0u8; SALT_LEN];
    rng.fill(&mut salt2)?;
    let mut iv2 = [0u8; BLOCK_LEN];
    rng.fill(&mut iv2)?;

    let mut inner = Zeroizing::new(Vec::with_capacity(EEK_LEN));
    inner.extend_from_slice(&salt2);
    inner.extend_from_slice(&iv2);
    inner.extend_from_slice(kgk.expose());
    debug_assert_eq!(inner.len(), EEK_LEN);

    let eek = symmetric::encrypt(outer_key, outer_iv, &inner, Padding::None)?;
    debug_assert_eq!(eek.len(), EEK_LEN);

    let blob_key = kdf::derive_blob_key(kgk.expose(), &salt2)?;

    let cipher_payload = if compress {
        let squeezed = Zeroizing::new(deflate(payload)?);
        symmetric::encrypt(blob_key.expose(), &iv2, &squeezed, Padding::Pkcs7)?
    } else {
        symmetric::encrypt(blob_key.expose(), &iv2, payload, Padding::Pkcs7)?
    };

    let total = HEADER_LEN
        .checked_add(cipher_payload.len())
        .ok_or_else(|| CryptoError::Encryption("envelope size overflow".into()))?;

    let mut out = Vec::with_capacity(total);
    out.push(FORMAT_FLAG);
    out.extend_from_slice(outer_salt);
    out.extend_from_slice(&eek);
    out.extend_from_slice(&cipher_payload);
    debug_assert_eq!(out.len(), total);

    Ok(out)
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Unwrap an envelope with the master password.
///
/// Returns the payload and the recovered KGK — byte-identical to whatever
/// KGK the producing [`encode`] was given. Derivation parameters are fixed
/// by the scheme, so the password plus the envelope bytes are all that is
/// needed.
///
/// `decompress` must match the `compress` flag the envelope was encoded
/// with.
///
/// # Errors
///
/// Returns `CryptoError::Format` if the envelope is empty or its leading
/// byte is not the recognized flag. Every other failure — truncated
/// envelope, wrong inner block length, invalid payload padding, failed
/// decompression — is `CryptoError::Integrity`, with no distinction
/// between a wrong master password and corrupted bytes.
pub fn decode(
    master_password: &[u8],
    envelope: &[u8],
    decompress: bool,
) -> Result<(SecureBuffer, SecureArray<KGK_LEN>), CryptoError> {
    let flag = envelope
        .first()
        .copied()
        .ok_or_else(|| CryptoError::Format("empty envelope".into()))?;
    if flag != FORMAT_FLAG {
        return Err(CryptoError::Format(format!(
            "unrecognized format flag {flag:#04x}"
        )));
    }
    if envelope.len() < HEADER_LEN {
        return Err(CryptoError::Integrity);
    }

    let outer_salt = &envelope[1..SALT_END];
    let eek = &envelope[SALT_END..EEK_END];
    let cipher_payload = &envelope[EEK_END..];

    let (outer_key, outer_iv) = kdf::derive_master_key_iv(master_password, outer_salt)?;

    let inner = symmetric::decrypt(outer_key.expose(), outer_iv.expose(), eek, Padding::None)?;
    if inner.len() != EEK_LEN {
        return Err(CryptoError::Integrity);
    }

    let salt2 = &inner.expose()[..SALT_LEN];
    let iv2 = &inner.expose()[SALT_LEN..INNER_IV2_END];
    let mut kgk_bytes = [0u8; KGK_LEN];
    kgk_bytes.copy_from_slice(&inner.expose()[INNER_IV2_END..EEK_LEN]);
    let kgk = SecureArray::new(kgk_bytes);
    kgk_bytes.zeroize();

    let blob_key = kdf::derive_blob_key(kgk.expose(), salt2)?;

    let plain = symmetric::decrypt(blob_key.expose(), iv2, cipher_payload, Padding::Pkcs7)?;

    let payload = if decompress {
        let mut restored = inflate(plain.expose())?;
        let buf = SecureBuffer::new(&restored);
        restored.zeroize();
        buf?
    } else {
        plain
    };

    Ok((payload, kgk))
}

// ---------------------------------------------------------------------------
// Compression
// ---------------------------------------------------------------------------

/// Deflate at the highest level; credential payloads are mostly
/// serialized text and squeeze well.
fn deflate(data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| CryptoError::Encryption(format!("compression failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| CryptoError::Encryption(format!("compression failed: {e}")))
}

/// Inflate a decrypted payload. Failure means the plaintext is not what
/// was encrypted — wrong password or corruption — so it reports as an
/// integrity failure, and any partially inflated bytes are wiped.
fn inflate(data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    if decoder.read_to_end(&mut out).is_err() {
        out.zeroize();
        return Err(CryptoError::Integrity);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
