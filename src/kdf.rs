//! Key derivation (`derive_key`): scrypt with an adjustable work factor.
//!
//! The output is always 32 bytes, used both as the AES-256 record key and
//! (independently salted) as the HMAC-SHA512 key in [`crate::mac`].

use crate::buffer::SecureBytes;
use crate::error::{Error, Result};

/// Default work factor (`N_exp`) when the caller doesn't override it.
pub const DEFAULT_WORK_FACTOR: u8 = 14;

/// Minimum valid work factor, inclusive.
pub const MIN_WORK_FACTOR: u8 = 10;

/// Maximum valid work factor, inclusive.
pub const MAX_WORK_FACTOR: u8 = 31;

/// scrypt output length in bytes.
const KEY_LEN: usize = 32;

/// scrypt block size parameter `r`.
const R: u32 = 8;

/// scrypt parallelization parameter `p`.
const P: u32 = 1;

fn check_work_factor(n_exp: u8) -> Result<()> {
    if !(MIN_WORK_FACTOR..=MAX_WORK_FACTOR).contains(&n_exp) {
        return Err(Error::WorkFactor(n_exp));
    }
    Ok(())
}

/// Derives a 32-byte key from `password` and an 8-byte `salt` using
/// scrypt with cost `N = 2^(n_exp + 1)`, `r = 8`, `p = 1`.
///
/// The doubled cost constant (`N = 2 << n_exp` in the original formula,
/// equivalently `2^(n_exp + 1)`) is a property the on-disk format depends
/// on; changing it would silently break compatibility with every existing
/// database and must not be done without a format version bump.
///
/// # Errors
///
/// Returns [`Error::WorkFactor`] if `n_exp` is outside `[10, 31]`.
pub fn derive_key(password: &[u8], salt: &[u8; 8], n_exp: u8) -> Result<SecureBytes> {
    check_work_factor(n_exp)?;

    // scrypt::Params::new takes log2(N) directly; N = 2^(n_exp + 1), so
    // log2(N) = n_exp + 1.
    let log_n = n_exp + 1;
    let params = scrypt::Params::new(log_n, R, P, KEY_LEN)
        .map_err(|e| Error::CryptoFormat(format!("invalid scrypt parameters: {e}")))?;

    let mut out = SecureBytes::new(KEY_LEN);
    scrypt::scrypt(password, salt, &params, out.as_bytes_mut())
        .map_err(|e| Error::CryptoFormat(format!("scrypt derivation failed: {e}")))?;
    Ok(out)
}
