//! # passwand
//!
//! Record cryptography and database engine for a password manager. A
//! database is a JSON file holding a list of individually encrypted
//! entries; each entry's three secret fields (`space`, `key`, `value`)
//! are sealed under a key derived from a user-supplied main password.
//!
//! This crate is the core engine only — it has no command-line parser,
//! no terminal prompter, and no logging subscriber. Those are a
//! downstream binary's job; this crate exposes the [`prompt::Prompter`]
//! trait and the [`ops::Engine`] operation entry points for one to drive.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use passwand::buffer::SecureBytes;
//! use passwand::ops::{Config, Engine, Outcome};
//! use passwand::prompt::{PromptOutcome, Prompter};
//! use passwand::scan::Jobs;
//! use passwand::error::Result;
//!
//! struct FixedPrompter(Vec<&'static [u8]>);
//!
//! impl Prompter for FixedPrompter {
//!     fn read_password(&mut self, _label: &str) -> Result<PromptOutcome> {
//!         if self.0.is_empty() {
//!             return Ok(PromptOutcome::Eof);
//!         }
//!         Ok(PromptOutcome::Password(SecureBytes::from_vec(self.0.remove(0).to_vec())))
//!     }
//!
//!     fn read_password_with_confirmation(&mut self, label: &str, _confirm: &str) -> Result<PromptOutcome> {
//!         self.read_password(label)
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let engine = Engine {
//!         data_path: "example.json".into(),
//!         chain: Vec::new(),
//!         config: Config { jobs: Jobs::Auto, work_factor: 14 },
//!     };
//!     let mut prompter = FixedPrompter(vec![b"hunter2"]);
//!     if let Outcome::Completed(()) = engine.set(&mut prompter, b"email", b"gmail", b"s3cr3t")? {
//!         println!("stored");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Format
//!
//! Entries are sealed with AES-256-CTR under a scrypt-derived key and
//! authenticated with HMAC-SHA512, inside a frame tagged with the header
//! `oprime01`. See [`cipher`] and [`mac`] for the exact byte layout; it
//! must be reproduced exactly (including a known quirk where one entry's
//! three fields share a keystream prefix) to stay compatible with
//! existing databases — see [`entry`]'s documentation.
//!
//! ## Error Handling
//!
//! All operations return [`error::Result<T>`], an alias for
//! `std::result::Result<T, error::Error>`. [`error::Error`] is
//! `#[non_exhaustive]` and covers every failure kind the engine defines,
//! from malformed on-disk state to authentication failure to lock
//! contention:
//!
//! ```rust,no_run
//! use passwand::error::Error;
//!
//! fn describe(err: &Error) -> &'static str {
//!     match err {
//!         Error::HmacMismatch => "wrong password or tampered entry",
//!         Error::Locked { .. } => "database is locked by another process",
//!         Error::Heterogeneous => "database mixes main passwords or work factors",
//!         _ => "other failure",
//!     }
//! }
//! ```
//!
//! ## Concurrency
//!
//! The scan engine (list/get/check) and the write path share one
//! process-wide [`random`] source and run worker threads sized by
//! [`scan::Jobs`] (default: hardware concurrency, clamped to entry
//! count). Secure buffers are never shared between threads by reference;
//! a worker hands ownership of any plaintext it produces to the
//! coordinator on completion.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod chain;
pub mod cipher;
pub mod codec;
pub mod database;
pub mod entry;
pub mod error;
pub mod generate;
pub mod kdf;
pub mod mac;
pub mod ops;
pub mod prompt;
pub mod random;
pub mod scan;
pub mod weakness;

pub use error::{Error, Result};
pub use ops::{Config, Engine, Outcome};
