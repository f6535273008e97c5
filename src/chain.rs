//! Chain resolver (§4.12): interprets an optional stack of auxiliary
//! databases, each holding the main password of the next, to materialize
//! the effective main password for the primary database.

use crate::buffer::SecureBytes;
use crate::database::{Database, LockMode};
use crate::error::{Error, Result};

/// One link in the chain: the database path and the work factor used to
/// open its single entry.
pub struct ChainLink {
    pub path: std::path::PathBuf,
    pub work_factor: u8,
}

/// Resolves the effective main password for the primary database.
///
/// `top` is the password the caller supplied for the first link (or the
/// primary database, if `chain` is empty). An empty `top` at the
/// outermost position means "skip this link" and prompts (via
/// `next_password`) for the password to the next one; skipping past the
/// end of the chain is [`Error::ChainOverSkip`].
///
/// `next_password` is called once per skipped link, in order, to obtain
/// the password for the next link — the prompting collaborator's job,
/// not this function's; it never touches a terminal itself.
pub fn resolve(
    top: SecureBytes,
    chain: &[ChainLink],
    mut next_password: impl FnMut() -> Result<SecureBytes>,
) -> Result<SecureBytes> {
    let mut current = top;
    let mut links = chain.iter();

    loop {
        if current.is_empty() {
            match links.next() {
                Some(_skipped) => {
                    current = next_password()?;
                    continue;
                }
                None => return Err(Error::ChainOverSkip),
            }
        }

        match links.next() {
            None => return Ok(current),
            Some(link) => {
                current = open_singleton(link, &current)?;
            }
        }
    }
}

fn open_singleton(link: &ChainLink, password: &SecureBytes) -> Result<SecureBytes> {
    let db = Database::open(&link.path, LockMode::Shared)?;
    if db.len() != 1 {
        return Err(Error::ChainNotSingleton);
    }
    let open = db.entries[0].open(password.as_bytes(), link.work_factor)?;
    Ok(open.value)
}
