//! Weak-password oracle (§4.10): a value is weak if it is short, drawn
//! from a single character class, a dictionary word, or present in a
//! bundled sample of breached-password hash prefixes.
//!
//! The dictionary and breach-prefix data are small illustrative samples
//! bundled via `include_str!`, not a full corpus — vendoring a
//! multi-gigabyte HIBP download is out of scope; a real deployment would
//! swap in the full "by prefix" dataset without changing this module's
//! logic.

use std::collections::HashSet;
use std::sync::OnceLock;

use sha1::{Digest, Sha1};

const DICTIONARY_SRC: &str = include_str!("data/dictionary.txt");
const HIBP_PREFIXES_SRC: &str = include_str!("data/hibp_prefixes.txt");

/// Number of hex characters of a SHA-1 digest used as the breach-prefix
/// key, i.e. 5 bytes of the 20-byte digest.
const PREFIX_LEN: usize = 10;

fn dictionary() -> &'static HashSet<String> {
    static DICTIONARY: OnceLock<HashSet<String>> = OnceLock::new();
    DICTIONARY.get_or_init(|| DICTIONARY_SRC.lines().map(|w| w.trim().to_ascii_lowercase()).filter(|w| !w.is_empty()).collect())
}

fn hibp_prefixes() -> &'static HashSet<String> {
    static PREFIXES: OnceLock<HashSet<String>> = OnceLock::new();
    PREFIXES.get_or_init(|| HIBP_PREFIXES_SRC.lines().map(|l| l.trim().to_ascii_uppercase()).filter(|l| !l.is_empty()).collect())
}

fn is_lower(b: u8) -> bool {
    b.is_ascii_lowercase()
}
fn is_upper(b: u8) -> bool {
    b.is_ascii_uppercase()
}
fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}
fn is_punct(b: u8) -> bool {
    b.is_ascii_punctuation()
}

fn single_character_class(value: &[u8]) -> bool {
    if value.is_empty() {
        return false;
    }
    let classes = [is_lower, is_upper, is_digit, is_punct];
    classes.iter().any(|class| value.iter().all(|&b| class(b)))
}

fn is_dictionary_word(value: &[u8]) -> bool {
    let Ok(s) = std::str::from_utf8(value) else { return false };
    dictionary().contains(&s.to_ascii_lowercase())
}

fn is_known_breached(value: &[u8]) -> bool {
    let digest = Sha1::digest(value);
    let hex = hex_upper(&digest);
    hibp_prefixes().contains(&hex[..PREFIX_LEN])
}

fn hex_upper(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{b:02X}").expect("writing to a String cannot fail");
    }
    out
}

/// Returns `true` if `value` meets any of the four weakness criteria of
/// §4.10. Any single criterion is sufficient.
pub fn is_weak(value: &[u8]) -> bool {
    value.len() < 8 || single_character_class(value) || is_dictionary_word(value) || is_known_breached(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_is_weak() {
        assert!(is_weak(b"abc1234"));
    }

    #[test]
    fn single_class_password_is_weak() {
        assert!(is_weak(b"aaaaaaaaaaaa"));
        assert!(is_weak(b"123456789012"));
    }

    #[test]
    fn dictionary_word_is_weak_case_insensitively() {
        assert!(is_weak(b"Password"));
        assert!(is_weak(b"DRAGON"));
    }

    #[test]
    fn breached_password_is_weak() {
        assert!(is_weak(b"P@ssw0rd"));
    }

    #[test]
    fn long_random_password_is_strong() {
        assert!(!is_weak(b"WEy2zHDJjLsNog8tE5hwvrIR0adAGrR4m5wh6y99ssyo1zzUESw9OWPp8yEL"));
    }
}
