//! Password generator (§4.11): uniform rejection sampling over a fixed
//! charset, avoiding modulo bias by rejecting random bytes outside the
//! largest multiple of the charset length below 256.

use crate::error::{Error, Result};
use crate::random;

/// Default generated length in bytes/characters.
pub const DEFAULT_LENGTH: usize = 24;

/// Default charset: `A-Z a-z 0-9 _`.
pub const DEFAULT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";

/// Generates `length` bytes drawn uniformly from `charset` via rejection
/// sampling.
///
/// # Errors
///
/// Returns [`Error::Length`] if `length` is zero, or if `charset` is
/// empty or longer than 256 bytes (no rejection threshold would leave a
/// usable range).
pub fn generate(length: usize, charset: &[u8]) -> Result<Vec<u8>> {
    if length == 0 {
        return Err(Error::Length);
    }
    if charset.is_empty() || charset.len() > 256 {
        return Err(Error::Length);
    }

    let charset_len = charset.len();
    // Largest multiple of charset_len that fits in a byte's range [0, 256).
    let threshold = (256 / charset_len) * charset_len;

    let mut out = Vec::with_capacity(length);
    while out.len() < length {
        let candidates = random::bytes_unbounded(length - out.len());
        for b in candidates {
            if (b as usize) < threshold {
                out.push(charset[(b as usize) % charset_len]);
                if out.len() == length {
                    break;
                }
            }
        }
    }
    Ok(out)
}
