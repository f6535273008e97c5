//! Property-based tests using proptest.
//!
//! These tests verify round-trip and tamper-detection invariants of the
//! entry seal/open pair (spec §4.7) against randomly generated inputs,
//! rather than the fixed examples already covered by `src/entry.rs`'s
//! unit tests.

use proptest::prelude::*;

use passwand::entry::OpenEntry;
use passwand::error::Error;

fn bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..64)
}

proptest! {
    /// Any entry sealed and reopened under the same password and work
    /// factor yields back its original plaintext.
    #[test]
    fn seal_open_roundtrips(
        space in bytes_strategy(),
        key in bytes_strategy(),
        value in bytes_strategy(),
        main in bytes_strategy(),
        wf in 10u8..=16,
    ) {
        let open = OpenEntry::new(space.clone(), key.clone(), value.clone());
        let sealed = open.seal(&main, wf).unwrap();
        let reopened = sealed.open(&main, wf).unwrap();
        prop_assert_eq!(reopened.space.as_bytes(), space.as_slice());
        prop_assert_eq!(reopened.key.as_bytes(), key.as_slice());
        prop_assert_eq!(reopened.value.as_bytes(), value.as_slice());
    }

    /// Reopening under any password other than the one an entry was
    /// sealed with always fails the HMAC check, never decrypts.
    #[test]
    fn wrong_password_never_opens(
        space in bytes_strategy(),
        key in bytes_strategy(),
        value in bytes_strategy(),
        main in bytes_strategy(),
        wrong in bytes_strategy(),
        wf in 10u8..=16,
    ) {
        prop_assume!(main != wrong);
        let open = OpenEntry::new(space, key, value);
        let sealed = open.seal(&main, wf).unwrap();
        let err = sealed.open(&wrong, wf).unwrap_err();
        prop_assert!(matches!(err, Error::HmacMismatch));
    }

    /// Flipping any single bit of any ciphertext-bearing field is
    /// detected by the HMAC check before decryption ever runs.
    #[test]
    fn single_bit_tamper_breaks_hmac(
        space in bytes_strategy().prop_filter("need a byte to flip", |v| !v.is_empty()),
        key in bytes_strategy(),
        value in bytes_strategy(),
        main in bytes_strategy(),
        wf in 10u8..=16,
        bit in 0u8..8,
    ) {
        let open = OpenEntry::new(space, key, value);
        let sealed = open.seal(&main, wf).unwrap();

        let mut tampered = sealed.clone();
        tampered.space[0] ^= 1 << bit;
        prop_assert!(matches!(tampered.open(&main, wf), Err(Error::HmacMismatch)));
    }

    /// Re-sealing an opened entry with unchanged plaintext, reusing its
    /// carried `(salt, iv, hmac_salt)`, reproduces byte-identical
    /// ciphertext and HMAC.
    #[test]
    fn reseal_is_byte_identical_when_unchanged(
        space in bytes_strategy(),
        key in bytes_strategy(),
        value in bytes_strategy(),
        main in bytes_strategy(),
        wf in 10u8..=16,
    ) {
        let open = OpenEntry::new(space, key, value);
        let sealed = open.seal(&main, wf).unwrap();
        let reopened = sealed.open(&main, wf).unwrap();
        let resealed = reopened.reseal(&main, wf).unwrap();

        prop_assert_eq!(&resealed.space, &sealed.space);
        prop_assert_eq!(&resealed.key, &sealed.key);
        prop_assert_eq!(&resealed.value, &sealed.value);
        prop_assert_eq!(resealed.hmac, sealed.hmac);
        prop_assert_eq!(resealed.hmac_salt, sealed.hmac_salt);
    }
}
