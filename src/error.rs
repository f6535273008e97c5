//! Error types for the passwand record engine.
//!
//! This module provides the [`Error`] enum, covering every failure mode
//! named in the specification: malformed on-disk state, cryptographic
//! verification failures, parameter misuse, database-locking contention,
//! chain resolution problems, and scan-level lookup failures.
//!
//! All fallible operations in this crate return `Result<T, Error>`.
//!
//! # Error Categories
//!
//! | Category | Variants | Typical Cause |
//! |----------|----------|----------------|
//! | I/O | [`MissingFile`][Self::MissingFile], [`Locked`][Self::Locked], [`Corrupt`][Self::Corrupt] | Filesystem / JSON shape |
//! | Crypto framing | [`CryptoFormat`][Self::CryptoFormat], [`IvMismatch`][Self::IvMismatch], [`CryptoLength`][Self::CryptoLength] | Malformed or wrong-key ciphertext |
//! | Authentication | [`HmacMismatch`][Self::HmacMismatch], [`ConfirmationMismatch`][Self::ConfirmationMismatch] | Wrong password, tampering |
//! | Parameters | [`WorkFactor`][Self::WorkFactor], [`Length`][Self::Length] | Caller-supplied values out of range |
//! | Database | [`Heterogeneous`][Self::Heterogeneous] | Mixed main passwords/work factors |
//! | Chain | [`ChainNotSingleton`][Self::ChainNotSingleton], [`ChainOverSkip`][Self::ChainOverSkip] | Malformed chain link |
//! | Scan | [`NotFound`][Self::NotFound], [`Duplicate`][Self::Duplicate] | `get`/`set` target absence/presence |
//! | Check | [`Weak`][Self::Weak] | `check` found weak passwords |

use std::io;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for passwand record-engine operations.
///
/// Each variant corresponds to one of the error kinds enumerated in the
/// specification (`io/*`, `crypto/*`, `auth/*`, `param/*`, `db/*`,
/// `chain/*`, `scan/*`, `check/weak`). The enum is `#[non_exhaustive]` so
/// new narrowly-scoped variants can be added without a breaking change.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    ///
    /// Wraps [`std::io::Error`]; returned for anything outside the more
    /// specific I/O variants below (e.g. permission errors on a present
    /// file, or a failure during the atomic rename of a database write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// `io/missing` — the database (or a chain database) does not exist
    /// and the operation requires it to.
    ///
    /// Not returned for `set`/`generate` against zero existing entries;
    /// a missing path there is treated as an empty database.
    #[error("database file not found: {path}")]
    MissingFile {
        /// The path that was expected to exist.
        path: String,
    },

    /// `io/locked` — the non-blocking advisory lock on the database path
    /// could not be acquired because another process holds it.
    ///
    /// This is returned immediately; the core never blocks waiting for a
    /// lock. See [`crate::database`] for the locking discipline.
    #[error("failed to lock database: {path}")]
    Locked {
        /// The path whose lock was contended.
        path: String,
    },

    /// `io/corrupt` — the database file's JSON shape is invalid, or an
    /// entry's base64 fields don't decode.
    #[error("corrupt database: {0}")]
    Corrupt(String),

    /// `crypto/format` — the decrypted frame is missing the `oprime01`
    /// header, or its length isn't 16-byte aligned.
    #[error("crypto format error: {0}")]
    CryptoFormat(String),

    /// `crypto/iv-mismatch` — the IV embedded in the decrypted frame does
    /// not match the IV stored alongside the ciphertext.
    ///
    /// This is the most common symptom of decrypting with the wrong main
    /// password or work factor: the AES-CTR keystream differs, so the
    /// frame's embedded copy of the IV decodes to garbage.
    #[error("embedded IV does not match stored IV")]
    IvMismatch,

    /// `crypto/length` — the frame's declared plaintext length is
    /// inconsistent with the remaining tail length.
    #[error("inconsistent plaintext length in frame")]
    CryptoLength,

    /// `auth/hmac` — HMAC verification failed before any decryption was
    /// attempted.
    ///
    /// Returned for a wrong main password, a wrong work factor, or any
    /// single-bit tamper of `space`, `key`, `value`, `salt`, or `iv`.
    #[error("HMAC verification failed")]
    HmacMismatch,

    /// `auth/mismatch` — a password confirmation prompt's second read did
    /// not match the first.
    #[error("password confirmation did not match")]
    ConfirmationMismatch,

    /// `param/work-factor` — the requested `N_exp` is outside `[10, 31]`.
    #[error("work factor {0} out of range [10, 31]")]
    WorkFactor(u8),

    /// `param/length` — `--length` (or the generator's `length` argument)
    /// was zero.
    #[error("length must be nonzero")]
    Length,

    /// `db/heterogeneous` — a write was attempted on a database containing
    /// one or more entries that did not open under the operation's
    /// `(main, work_factor)`.
    ///
    /// No write occurs when this is returned; the file on disk is
    /// untouched.
    #[error("database contains entries under a different main password or work factor")]
    Heterogeneous,

    /// `chain/not-singleton` — a chain database did not contain exactly
    /// one entry.
    #[error("chain database does not contain exactly one entry")]
    ChainNotSingleton,

    /// `chain/over-skip` — the user supplied an empty password to skip
    /// more chain links than exist.
    #[error("skipped more chain links than exist")]
    ChainOverSkip,

    /// `scan/not-found` — `get`/`update`/`delete` found no entry matching
    /// the requested `(space, key)`.
    #[error("no entry found for {space}/{key}")]
    NotFound {
        /// The requested space.
        space: String,
        /// The requested key.
        key: String,
    },

    /// `scan/duplicate` — `set`/`generate` found an entry already present
    /// at the requested `(space, key)`.
    #[error("entry already exists for {space}/{key}")]
    Duplicate {
        /// The requested space.
        space: String,
        /// The requested key.
        key: String,
    },

    /// `check/weak` — `check` completed successfully but found one or more
    /// weak passwords.
    ///
    /// This is returned *after* the scan has fully completed and printed
    /// its findings; it exists so callers can translate it to a non-zero
    /// exit code without treating `check` itself as having failed to run.
    #[error("{count} weak password(s) found")]
    Weak {
        /// Number of entries classified as weak.
        count: usize,
    },
}
