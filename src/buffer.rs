//! Secure byte buffers for plaintext and derived keys.
//!
//! [`SecureBytes`] is the only storage this crate uses for the main
//! password, scrypt output keys, and plaintext entry fields. It wipes its
//! contents on drop (using [`zeroize`], which performs a volatile write
//! the compiler cannot elide) and makes a best-effort attempt to pin the
//! allocation into RAM via `mlock` so it is never swapped to disk —
//! failing open if the OS denies locking, since a password manager that
//! refuses to run under a restrictive `RLIMIT_MEMLOCK` is worse than one
//! that degrades gracefully.

use std::ops::{Deref, DerefMut};

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// A heap allocation holding sensitive bytes, wiped and best-effort
/// memory-locked for its entire lifetime.
///
/// Equality is constant-time (`subtle::ConstantTimeEq`), which is what
/// makes this type suitable for HMAC tag comparison as well as plaintext
/// storage: there is only one code path, so callers can't accidentally
/// reach for a variable-time `==` on secret-derived data.
pub struct SecureBytes {
    data: Vec<u8>,
    locked: bool,
}

impl SecureBytes {
    /// Allocates `len` zeroed bytes and attempts to lock them in memory.
    pub fn new(len: usize) -> Self {
        let mut data = vec![0u8; len];
        let locked = mlock(&mut data);
        Self { data, locked }
    }

    /// Takes ownership of existing bytes, attempting to lock them in
    /// place.
    pub fn from_vec(mut data: Vec<u8>) -> Self {
        let locked = mlock(&mut data);
        Self { data, locked }
    }

    /// Returns the buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the buffer contents as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the buffer contents as a mutable byte slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Replaces the contents with `new_data`, wiping the old contents
    /// first and re-attempting the memory lock on the new allocation.
    pub fn set(&mut self, new_data: Vec<u8>) {
        self.data.zeroize();
        munlock(&mut self.data, self.locked);
        self.data = new_data;
        self.locked = mlock(&mut self.data);
    }
}

impl Deref for SecureBytes {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for SecureBytes {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Clone for SecureBytes {
    fn clone(&self) -> Self {
        Self::from_vec(self.data.clone())
    }
}

/// Constant-time equality, suitable for HMAC tag and password comparison.
impl PartialEq for SecureBytes {
    fn eq(&self, other: &Self) -> bool {
        self.data.ct_eq(&other.data).into()
    }
}
impl Eq for SecureBytes {}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.data.zeroize();
        munlock(&mut self.data, self.locked);
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBytes").field("len", &self.data.len()).finish()
    }
}

#[cfg(unix)]
fn mlock(data: &mut [u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    // SAFETY: `data` is a valid, non-empty slice for its own length; mlock
    // only adjusts the page table entries backing it and does not alias
    // or invalidate the pointer.
    let rc = unsafe { libc::mlock(data.as_ptr() as *const libc::c_void, data.len()) };
    rc == 0
}

#[cfg(not(unix))]
fn mlock(_data: &mut [u8]) -> bool {
    false
}

#[cfg(unix)]
fn munlock(data: &mut [u8], locked: bool) {
    if !locked || data.is_empty() {
        return;
    }
    // SAFETY: mirrors the mlock call above; munlock is a no-op if the
    // pages were never locked, which cannot happen here since `locked`
    // gates the call.
    unsafe {
        libc::munlock(data.as_ptr() as *const libc::c_void, data.len());
    }
}

#[cfg(not(unix))]
fn munlock(_data: &mut [u8], _locked: bool) {}
