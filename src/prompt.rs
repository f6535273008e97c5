//! The prompting collaborator contract (§6.2).
//!
//! This crate never reads from a terminal itself. Callers supply a
//! [`Prompter`] implementation; a downstream binary would back it with
//! `rpassword` or similar. Test code backs it with an in-memory fixture.

use crate::buffer::SecureBytes;
use crate::error::Result;

/// The labels the operation engine uses when prompting. Passed verbatim
/// to [`Prompter::read_password`] / [`Prompter::read_password_with_confirmation`]
/// so a terminal-backed implementation can render them.
pub mod labels {
    pub const MAIN_PASSWORD: &str = "main password";
    pub const NEW_MAIN_PASSWORD: &str = "new main password";
    pub const CONFIRM_MAIN_PASSWORD: &str = "confirm main password";
    pub const CONFIRM_NEW_MAIN_PASSWORD: &str = "confirm new main password";
}

/// Outcome of a single password read: either a password, or "the caller
/// gave up" (EOF on the underlying input). Distinguished from [`Result`]'s
/// error case because EOF on the *first* prompt is a successful no-op for
/// most operations, not a failure (see §6.2).
pub enum PromptOutcome {
    Password(SecureBytes),
    Eof,
}

/// The interactive password prompter the operation engine calls out to.
///
/// Implementations must not echo input and must zero any transient
/// buffers they use internally — this crate's half of that contract is
/// returning the result as [`SecureBytes`], not [`String`].
pub trait Prompter {
    /// Reads one password for `label`. Returns [`PromptOutcome::Eof`] if
    /// the input stream ended before any characters were read.
    fn read_password(&mut self, label: &str) -> Result<PromptOutcome>;

    /// Reads a password for `label`, then re-prompts with a `confirm_label`
    /// until two reads match. Fails with [`crate::error::Error::ConfirmationMismatch`]
    /// if an implementation chooses not to retry indefinitely and instead
    /// gives up after its own retry policy.
    fn read_password_with_confirmation(&mut self, label: &str, confirm_label: &str) -> Result<PromptOutcome>;
}
