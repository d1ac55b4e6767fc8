//! Randomness source for the envelope codec.
//!
//! The codec pulls its salts and IVs through [`RandomSource`] rather than
//! calling the OS generator directly, so tests can substitute a
//! deterministic generator and pin envelope bytes. Production callers pass
//! [`rand::rngs::OsRng`]: the process-wide OS CSPRNG, internally
//! synchronized, safe to share across concurrent encode calls, and never
//! manually reseeded.

use crate::error::CryptoError;
use rand::RngCore;

/// Source of cryptographically secure (or, in tests, deterministic)
/// random bytes.
pub trait RandomSource {
    /// Fill `dest` entirely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the generator fails.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// Every `rand` generator is a [`RandomSource`]. `OsRng` is the production
/// choice; seeded or stepping generators serve as test fixtures.
impl<R: RngCore> RandomSource for R {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
        self.try_fill_bytes(dest)
            .map_err(|e| CryptoError::SecureMemory(format!("CSPRNG fill failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
