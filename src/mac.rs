//! MAC (`mac`): HMAC-SHA512 over the canonical concatenation of entry
//! fields, keyed by an independently-salted scrypt-derived key.

use hmac::{Hmac, Mac as _};
use sha2::Sha512;

use crate::error::Result;
use crate::kdf::derive_key;
use crate::random;

type HmacSha512 = Hmac<Sha512>;

/// Length in bytes of an HMAC-SHA512 tag.
pub const TAG_LEN: usize = 64;

/// Computes `(hmac_salt, tag)` for `main_password` over canonical data
/// `C = space ‖ key ‖ value ‖ salt ‖ iv` at work factor `wf`.
///
/// If `salt` is `None`, a fresh random 8-byte salt is generated. The
/// returned tag is always 64 bytes (`TAG_LEN`).
pub fn compute(
    main_password: &[u8],
    canonical: &[u8],
    salt: Option<[u8; 8]>,
    wf: u8,
) -> Result<([u8; 8], [u8; TAG_LEN])> {
    let salt = salt.unwrap_or_else(|| {
        let bytes = random::bytes(8);
        let mut out = [0u8; 8];
        out.copy_from_slice(&bytes);
        out
    });

    let key = derive_key(main_password, &salt, wf)?;
    // HmacSha512::new_from_slice accepts any key length.
    let mut mac = HmacSha512::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(canonical);
    let tag = mac.finalize().into_bytes();

    let mut out = [0u8; TAG_LEN];
    out.copy_from_slice(&tag);
    Ok((salt, out))
}

/// Builds the canonical concatenation `space ‖ key ‖ value ‖ salt ‖ iv`
/// used as MAC input.
pub fn canonical(space: &[u8], key: &[u8], value: &[u8], salt: &[u8], iv: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(space.len() + key.len() + value.len() + salt.len() + iv.len());
    out.extend_from_slice(space);
    out.extend_from_slice(key);
    out.extend_from_slice(value);
    out.extend_from_slice(salt);
    out.extend_from_slice(iv);
    out
}

/// Constant-time comparison of two HMAC tags.
pub fn tags_equal(a: &[u8; TAG_LEN], b: &[u8; TAG_LEN]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}
