//! Secure containers for key material and other secrets.
//!
//! This module provides:
//! - [`SecureBuffer`] — variable-length secret bytes, zeroized on drop
//! - [`SecureArray`] — fixed-size secret bytes (keys, IVs, the KGK)
//! - [`disable_core_dumps`] — process hardening for the hosting application
//!
//! Every value derived from or equal to a secret (master password, derived
//! keys, the key generation key) travels in one of these containers. Both
//! wipe their backing memory before release, pin it in RAM via `mlock`
//! where the platform allows, and mask `Debug`/`Display` output.

use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// mlock guard
// ---------------------------------------------------------------------------

/// Keeps a memory region pinned in RAM for as long as the guard lives.
///
/// `mlock` failure (quota, privileges) is a soft fallback: the secret is
/// still zeroized on drop, it just may hit swap in the meantime. A single
/// process-wide warning is printed the first time pinning fails.
struct MlockGuard {
    ptr: *const u8,
    len: usize,
    pinned: bool,
}

// SAFETY: The pointer is only handed to mlock/munlock, which are
// thread-safe syscalls. The guarded bytes are owned and accessed solely by
// the enclosing SecureBuffer/SecureArray.
unsafe impl Send for MlockGuard {}
unsafe impl Sync for MlockGuard {}

impl MlockGuard {
    const fn unpinned() -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
            pinned: false,
        }
    }

    fn pin(ptr: *const u8, len: usize) -> Self {
        let pinned = platform::try_mlock(ptr, len);
        if !pinned && len > 0 {
            static WARNED: std::sync::Once = std::sync::Once::new();
            WARNED.call_once(|| {
                eprintln!(
                    "[coffre-crypto-core] WARNING: mlock failed — \
                     secret data may be swapped to disk. \
                     Consider raising RLIMIT_MEMLOCK."
                );
            });
        }
        Self { ptr, len, pinned }
    }

    const fn is_pinned(&self) -> bool {
        self.pinned
    }
}

impl Drop for MlockGuard {
    fn drop(&mut self) {
        if self.pinned {
            platform::try_munlock(self.ptr, self.len);
        }
    }
}

// ---------------------------------------------------------------------------
// SecureBuffer — variable-length
// ---------------------------------------------------------------------------

/// Variable-length container for secret bytes.
///
/// Backed by [`SecretSlice<u8>`] from the `secrecy` crate, which zeroizes
/// on drop. On top of that, the allocation is `mlock`'d (soft fallback)
/// and `Debug`/`Display` print a fixed mask instead of the contents.
pub struct SecureBuffer {
    inner: SecretSlice<u8>,
    guard: MlockGuard,
}

impl SecureBuffer {
    /// Copy `data` into a fresh secure allocation.
    ///
    /// The caller keeps ownership of the source slice and should zeroize
    /// it once this returns.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if allocation fails.
    pub fn new(data: &[u8]) -> Result<Self, CryptoError> {
        let inner: SecretSlice<u8> = data.to_vec().into();
        let exposed = inner.expose_secret();
        let guard = MlockGuard::pin(exposed.as_ptr(), exposed.len());
        Ok(Self { inner, guard })
    }

    /// Allocate `len` bytes of fresh CSPRNG output.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the CSPRNG fails.
    pub fn random(len: usize) -> Result<Self, CryptoError> {
        let mut bytes = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::SecureMemory(format!("CSPRNG fill failed: {e}")))?;
        let result = Self::new(&bytes);
        bytes.zeroize();
        result
    }

    /// Expose the raw bytes for a cryptographic operation.
    ///
    /// Keep the exposure short-lived — prefer passing the slice straight
    /// into the operation over binding it to a variable.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Whether the buffer holds zero bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the backing memory is currently `mlock`'d.
    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        self.guard.is_pinned()
    }
}

impl fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureBuffer(***)")
    }
}

impl fmt::Display for SecureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureBuffer(***)")
    }
}

// ---------------------------------------------------------------------------
// SecureArray<N> — fixed-size
// ---------------------------------------------------------------------------

/// Fixed-size container for secrets whose length is part of their contract:
/// AES keys (32), IVs (16), the key generation key (64).
///
/// Encoding the length in the type removes a whole class of runtime length
/// checks — a `SecureArray<64>` KGK cannot be the wrong size.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecureArray<const N: usize> {
    bytes: [u8; N],
    // The guard handles munlock in its own Drop; zeroize must not touch it.
    #[zeroize(skip)]
    guard: MlockGuard,
}

impl<const N: usize> SecureArray<N> {
    /// Take ownership of a fixed-size secret.
    ///
    /// `mlock` pins the array at its post-move address. If the value moves
    /// again later the pin goes stale — acceptable, because pinning is
    /// best-effort (`munlock` on a stale address is a harmless no-op) and
    /// zeroize-on-drop holds regardless.
    #[must_use]
    pub fn new(data: [u8; N]) -> Self {
        let mut s = Self {
            bytes: data,
            guard: MlockGuard::unpinned(),
        };
        s.guard = MlockGuard::pin(s.bytes.as_ptr(), N);
        s
    }

    /// Fill a new array from the CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the CSPRNG fails.
    pub fn random() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; N];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::SecureMemory(format!("CSPRNG fill failed: {e}")))?;
        Ok(Self::new(bytes))
    }

    /// Expose the raw bytes for a cryptographic operation.
    #[must_use]
    pub const fn expose(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> fmt::Debug for SecureArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureArray<{N}>(***)")
    }
}

impl<const N: usize> fmt::Display for SecureArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureArray<{N}>(***)")
    }
}

impl<const N: usize> From<[u8; N]> for SecureArray<N> {
    fn from(data: [u8; N]) -> Self {
        Self::new(data)
    }
}

// ---------------------------------------------------------------------------
// Core dump disabling
// ---------------------------------------------------------------------------

/// Disable core dumps for the current process.
///
/// On Unix this sets `RLIMIT_CORE` to 0 (soft and hard). Elsewhere it is a
/// no-op. Intended to be called once by the hosting application before any
/// secret enters memory.
///
/// # Errors
///
/// Returns `CryptoError::SecureMemory` if the `setrlimit` call fails.
pub fn disable_core_dumps() -> Result<(), CryptoError> {
    platform::disable_core_dumps_impl()
}

// ---------------------------------------------------------------------------
// Platform-specific implementations
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod platform {
    use crate::error::CryptoError;

    pub(super) fn try_mlock(ptr: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: mlock accepts any valid pointer/length pair; an invalid
        // region yields ENOMEM which we report as "not pinned".
        unsafe { libc::mlock(ptr.cast(), len) == 0 }
    }

    pub(super) fn try_munlock(ptr: *const u8, len: usize) {
        if len == 0 {
            return;
        }
        // SAFETY: munlock failure is non-critical.
        unsafe {
            libc::munlock(ptr.cast(), len);
        }
    }

    pub(super) fn disable_core_dumps_impl() -> Result<(), CryptoError> {
        let limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: setrlimit with RLIMIT_CORE is a standard POSIX call.
        let ret = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &raw const limit) };
        if ret != 0 {
            return Err(CryptoError::SecureMemory(
                "failed to disable core dumps via RLIMIT_CORE".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod platform {
    use crate::error::CryptoError;

    pub(super) fn try_mlock(_ptr: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) fn try_munlock(_ptr: *const u8, _len: usize) {}

    pub(super) fn disable_core_dumps_impl() -> Result<(), CryptoError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
