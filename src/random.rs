//! Process-wide cryptographically secure random byte source.
//!
//! A single [`rand::rngs::OsRng`] instance serves all callers, constructed
//! lazily and thread-safely behind a [`std::sync::OnceLock`] — the same
//! lazy one-shot pattern the teacher repository uses for its caches.
//! `OsRng` itself has no internal state to guard, so no further
//! synchronization is required once constructed.

use std::sync::OnceLock;

use rand::RngCore;
use rand::rngs::OsRng;

/// Maximum number of bytes a single [`random_bytes`] call will produce.
///
/// Callers needing more must loop; this cap keeps a single call's cost
/// bounded and matches the specification's per-request limit.
pub const MAX_REQUEST: usize = 256;

fn rng() -> &'static std::sync::Mutex<OsRng> {
    static RNG: OnceLock<std::sync::Mutex<OsRng>> = OnceLock::new();
    RNG.get_or_init(|| std::sync::Mutex::new(OsRng))
}

/// Fills `buf` with uniformly distributed random bytes.
///
/// # Panics
///
/// Panics if `buf.len()` exceeds [`MAX_REQUEST`]; callers that need more
/// than 256 bytes must loop and call this repeatedly.
pub fn fill(buf: &mut [u8]) {
    assert!(
        buf.len() <= MAX_REQUEST,
        "random_bytes: request of {} exceeds max of {MAX_REQUEST}; loop instead",
        buf.len()
    );
    let mut guard = rng().lock().unwrap_or_else(|poisoned| {
        log::warn!("process RNG mutex was poisoned, recovering");
        poisoned.into_inner()
    });
    guard.fill_bytes(buf);
}

/// Returns `len` uniformly distributed random bytes.
///
/// # Panics
///
/// Panics if `len` exceeds [`MAX_REQUEST`]; see [`fill`].
pub fn bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    fill(&mut buf);
    buf
}

/// Returns `len` random bytes, looping internally to satisfy requests
/// larger than [`MAX_REQUEST`].
pub fn bytes_unbounded(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    for chunk in buf.chunks_mut(MAX_REQUEST) {
        fill(chunk);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_requested_length() {
        let b = bytes(8);
        assert_eq!(b.len(), 8);
    }

    #[test]
    fn unbounded_handles_large_requests() {
        let b = bytes_unbounded(1000);
        assert_eq!(b.len(), 1000);
    }

    #[test]
    #[should_panic]
    fn panics_over_cap() {
        let mut buf = vec![0u8; MAX_REQUEST + 1];
        fill(&mut buf);
    }

    #[test]
    fn looks_random_not_all_zero() {
        let b = bytes(32);
        assert!(b.iter().any(|&x| x != 0));
    }
}
