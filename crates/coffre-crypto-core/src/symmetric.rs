//! AES-256-CBC block-cipher transform with selectable padding.
//!
//! This module provides:
//! - [`encrypt`] / [`decrypt`] — one CBC pass under an explicit key + IV
//! - [`Padding`] — no-padding for fixed-size blocks, PKCS#7 for payloads
//!
//! The envelope uses both disciplines: the 112-byte inner key block is
//! encrypted without padding (its length is an exact block multiple by
//! construction), the variable-size bulk payload with PKCS#7.
//!
//! CBC carries no authentication tag. A decrypt that passes the padding
//! check can still be an undetected forgery; the envelope layer documents
//! this as an inherited limitation of the scheme.

use crate::error::CryptoError;
use crate::memory::SecureBuffer;
use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use zeroize::Zeroize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// AES block (and CBC IV) length in bytes.
pub const BLOCK_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Padding discipline for one CBC pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Padding {
    /// No padding — input length must already be a block multiple.
    /// Output length equals input length.
    None,
    /// PKCS#7 — 1 to 16 padding bytes appended on encrypt, validated and
    /// stripped on decrypt.
    Pkcs7,
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` with AES-256-CBC under `key` and `iv`.
///
/// # Errors
///
/// Returns `CryptoError::ContractViolation` if the key is not 32 bytes,
/// the IV is not 16 bytes, or `Padding::None` is requested for an input
/// whose length is not a multiple of 16 — all caller bugs, checked before
/// any cipher work.
pub fn encrypt(
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
    padding: Padding,
) -> Result<Vec<u8>, CryptoError> {
    check_key_iv(key, iv)?;

    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|_| CryptoError::Encryption("AES-256-CBC key/IV setup failed".into()))?;

    match padding {
        Padding::None => {
            if plaintext.len() % BLOCK_LEN != 0 {
                return Err(CryptoError::ContractViolation(format!(
                    "unpadded plaintext must be a multiple of {BLOCK_LEN} bytes, got {}",
                    plaintext.len()
                )));
            }
            Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(plaintext))
        }
        Padding::Pkcs7 => Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
    }
}

/// Decrypt `ciphertext` with AES-256-CBC under `key` and `iv`.
///
/// The plaintext comes back in a [`SecureBuffer`] — decrypted bytes are
/// secret until the caller decides otherwise.
///
/// # Errors
///
/// Returns `CryptoError::ContractViolation` for a wrong key or IV length.
/// Returns `CryptoError::Integrity` if the ciphertext length is not a
/// block multiple, or if PKCS#7 validation fails after decryption — the
/// two ways a wrong key or corrupted input shows up at this layer. The
/// error carries no further detail.
pub fn decrypt(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    padding: Padding,
) -> Result<SecureBuffer, CryptoError> {
    check_key_iv(key, iv)?;

    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::Integrity);
    }

    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| CryptoError::Encryption("AES-256-CBC key/IV setup failed".into()))?;

    let mut plain = match padding {
        Padding::None => cipher
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(|_| CryptoError::Integrity)?,
        Padding::Pkcs7 => cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::Integrity)?,
    };

    let result = SecureBuffer::new(&plain);
    plain.zeroize();
    result
}

fn check_key_iv(key: &[u8], iv: &[u8]) -> Result<(), CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::ContractViolation(format!(
            "key must be {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    if iv.len() != BLOCK_LEN {
        return Err(CryptoError::ContractViolation(format!(
            "IV must be {BLOCK_LEN} bytes, got {}",
            iv.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
