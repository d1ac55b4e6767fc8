//! Error types for `coffre-crypto-core`.

use thiserror::Error;

/// Errors produced by the envelope-encryption core.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A caller broke a fixed-size or parameter contract (wrong key, salt,
    /// or IV length, zero iteration count). This is a programming error,
    /// not a runtime condition — raised before any cryptographic work.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The envelope's leading format byte is missing or unrecognized.
    #[error("unrecognized envelope format: {0}")]
    Format(String),

    /// An internal consistency check failed during decode: wrong inner
    /// block length, invalid padding, or failed decompression. Carries no
    /// detail — a wrong master password and corrupted envelope bytes must
    /// be indistinguishable to the caller.
    #[error("envelope integrity check failed")]
    Integrity,

    /// Cipher-layer failure outside the integrity checks (key setup,
    /// compression stream errors).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Secure memory allocation or CSPRNG failure.
    #[error("secure memory error: {0}")]
    SecureMemory(String),
}
