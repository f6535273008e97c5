//! Operation engine: the seven high-level commands built on the
//! primitives in the rest of this crate.
//!
//! Every operation follows the same shape: open the database (which
//! acquires its lock immediately), resolve the effective main password
//! (prompting, possibly through a chain), then act. The lock is held for
//! the operation's entire lifetime because [`crate::database::Database`]
//! holds the file open until dropped — this is what gives write
//! operations the "lock scope covers the password prompt" guarantee of
//! §4.8.

use std::path::PathBuf;

use crate::buffer::SecureBytes;
use crate::chain::{self, ChainLink};
use crate::database::{Database, LockMode};
use crate::entry::{self, OpenEntry};
use crate::error::{Error, Result};
use crate::generate;
use crate::prompt::{labels, PromptOutcome, Prompter};
use crate::scan::{self, Jobs};
use crate::weakness;

/// Parameters shared by every operation.
pub struct Config {
    pub jobs: Jobs,
    pub work_factor: u8,
}

/// What an operation did, distinguishing an ordinary result from "the
/// caller gave up at the first password prompt" (§6.2's EOF-as-cancellation
/// rule). Translating `Cancelled` to an exit code is the caller's job;
/// every operation except [`Engine::get`] treats it as a successful
/// no-op, `get` treats it as a failure.
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

/// Result of a `list` scan: successfully-opened `(space, key)` pairs in
/// document order, plus how many entries failed to open under the
/// resolved main password (a nonzero count is a heterogeneous database,
/// per §4.9 — `list` still succeeds, but a caller typically surfaces a
/// nonzero exit code for it).
pub struct ListResult {
    pub entries: Vec<(String, String)>,
    pub failed: usize,
}

/// A single-database, no-chain engine. Construct with an empty `chain`
/// for the common case.
pub struct Engine {
    pub data_path: PathBuf,
    pub chain: Vec<ChainLink>,
    pub config: Config,
}

impl Engine {
    fn open_primary(&self, mode: LockMode) -> Result<Database> {
        Database::open(&self.data_path, mode)
    }

    /// Prompts for and resolves the effective main password. Returns
    /// `Ok(None)` if the caller hit EOF on the very first prompt.
    fn resolve_main<P: Prompter>(&self, prompter: &mut P) -> Result<Option<SecureBytes>> {
        let top = match prompter.read_password(labels::MAIN_PASSWORD)? {
            PromptOutcome::Password(p) => p,
            PromptOutcome::Eof => return Ok(None),
        };
        let resolved = chain::resolve(top, &self.chain, || match prompter.read_password(labels::MAIN_PASSWORD)? {
            PromptOutcome::Password(p) => Ok(p),
            PromptOutcome::Eof => Err(Error::ChainOverSkip),
        })?;
        Ok(Some(resolved))
    }

    /// Opens every entry; if any fails, no indices are returned and
    /// [`Error::Heterogeneous`] propagates instead — the caller must not
    /// write in that case.
    fn open_all_homogeneous(&self, db: &Database, main: &[u8]) -> Result<Vec<(usize, OpenEntry)>> {
        let wf = self.config.work_factor;
        let mut any_failed = false;
        let opened = scan::scan_all(&db.entries, self.config.jobs, |sealed| sealed.open(main, wf), |_, _| any_failed = true);
        if any_failed {
            log::warn!("database contains entries that did not open under the supplied main password");
            return Err(Error::Heterogeneous);
        }
        Ok(opened)
    }

    fn find<'a>(opened: &'a [(usize, OpenEntry)], space: &[u8], key: &[u8]) -> Option<&'a (usize, OpenEntry)> {
        opened.iter().find(|(_, e)| e.space.as_bytes() == space && e.key.as_bytes() == key)
    }

    /// `list`: every entry that opens under the resolved main password,
    /// in document order.
    pub fn list<P: Prompter>(&self, prompter: &mut P) -> Result<Outcome<ListResult>> {
        let db = self.open_primary(LockMode::Shared)?;
        let Some(main) = self.resolve_main(prompter)? else {
            return Ok(Outcome::Cancelled);
        };

        let mut failed = 0usize;
        let opened = scan::scan_all(&db.entries, self.config.jobs, |sealed| sealed.open(main.as_bytes(), self.config.work_factor), |_, _| failed += 1);

        let mut entries: Vec<(usize, (String, String))> = opened
            .into_iter()
            .map(|(i, e)| (i, (display(e.space.as_bytes()), display(e.key.as_bytes()))))
            .collect();
        entries.sort_by_key(|(i, _)| *i);

        Ok(Outcome::Completed(ListResult { entries: entries.into_iter().map(|(_, pair)| pair).collect(), failed }))
    }

    /// `get`: the first (in document order) matching entry's plaintext
    /// value. EOF on the first prompt is an error here, unlike every
    /// other operation (§6.2).
    pub fn get<P: Prompter>(&self, prompter: &mut P, space: &[u8], key: &[u8]) -> Result<SecureBytes> {
        let db = self.open_primary(LockMode::Shared)?;
        let main = self.resolve_main(prompter)?.ok_or_else(|| {
            Error::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "main password prompt reached EOF"))
        })?;
        let wf = self.config.work_factor;

        let index = scan::scan_first(&db.entries, self.config.jobs, |sealed| {
            let open = sealed.open(main.as_bytes(), wf)?;
            Ok(open.space.as_bytes() == space && open.key.as_bytes() == key)
        });
        let Some(index) = index else {
            return Err(Error::NotFound { space: display(space), key: display(key) });
        };
        let open = db.entries[index].open(main.as_bytes(), wf)?;
        Ok(open.value)
    }

    /// `set`: insert a new entry. Fails with [`Error::Duplicate`] if
    /// `(space, key)` already exists.
    pub fn set<P: Prompter>(&self, prompter: &mut P, space: &[u8], key: &[u8], value: &[u8]) -> Result<Outcome<()>> {
        let mut db = self.open_primary(LockMode::Exclusive)?;
        let Some(main) = self.resolve_main(prompter)? else {
            return Ok(Outcome::Cancelled);
        };
        let opened = self.open_all_homogeneous(&db, main.as_bytes())?;
        if Self::find(&opened, space, key).is_some() {
            return Err(Error::Duplicate { space: display(space), key: display(key) });
        }

        let sealed = OpenEntry::new(space.to_vec(), key.to_vec(), value.to_vec()).seal(main.as_bytes(), self.config.work_factor)?;
        db.entries.push(sealed);
        db.store()?;
        Ok(Outcome::Completed(()))
    }

    /// `update`: replace an existing entry's value in place, leaving
    /// every other entry's on-disk bytes untouched.
    pub fn update<P: Prompter>(&self, prompter: &mut P, space: &[u8], key: &[u8], value: &[u8]) -> Result<Outcome<()>> {
        let mut db = self.open_primary(LockMode::Exclusive)?;
        let Some(main) = self.resolve_main(prompter)? else {
            return Ok(Outcome::Cancelled);
        };
        let mut opened = self.open_all_homogeneous(&db, main.as_bytes())?;
        let Some(pos) = opened.iter().position(|(_, e)| e.space.as_bytes() == space && e.key.as_bytes() == key) else {
            return Err(Error::NotFound { space: display(space), key: display(key) });
        };
        let (index, mut entry) = opened.swap_remove(pos);
        entry.value.set(value.to_vec());
        db.entries[index] = entry.reseal(main.as_bytes(), self.config.work_factor)?;
        db.store()?;
        Ok(Outcome::Completed(()))
    }

    /// `delete`: remove an existing entry.
    pub fn delete<P: Prompter>(&self, prompter: &mut P, space: &[u8], key: &[u8]) -> Result<Outcome<()>> {
        let mut db = self.open_primary(LockMode::Exclusive)?;
        let Some(main) = self.resolve_main(prompter)? else {
            return Ok(Outcome::Cancelled);
        };
        let opened = self.open_all_homogeneous(&db, main.as_bytes())?;
        let Some((index, _)) = Self::find(&opened, space, key) else {
            return Err(Error::NotFound { space: display(space), key: display(key) });
        };
        db.entries.remove(*index);
        db.store()?;
        Ok(Outcome::Completed(()))
    }

    /// `check`: classify every entry's value as weak or strong (§4.10).
    /// `on_weak` is invoked once per weak entry, in document order, with
    /// its `(space, key)` already decoded to a display string. Returns
    /// [`Error::Weak`] after the scan completes if any entry was weak.
    pub fn check<P: Prompter>(&self, prompter: &mut P, mut on_weak: impl FnMut(&str, &str)) -> Result<Outcome<()>> {
        let db = self.open_primary(LockMode::Shared)?;
        let Some(main) = self.resolve_main(prompter)? else {
            return Ok(Outcome::Cancelled);
        };

        let mut opened = scan::scan_all(&db.entries, self.config.jobs, |sealed| sealed.open(main.as_bytes(), self.config.work_factor), |_, _| {});
        opened.sort_by_key(|(i, _)| *i);

        let mut weak_count = 0usize;
        for (_, open) in &opened {
            if weakness::is_weak(open.value.as_bytes()) {
                weak_count += 1;
                on_weak(&display(open.space.as_bytes()), &display(open.key.as_bytes()));
            }
        }

        if weak_count > 0 {
            return Err(Error::Weak { count: weak_count });
        }
        Ok(Outcome::Completed(()))
    }

    /// `change-main`: re-seal every entry under a freshly-prompted new
    /// main password. Refuses (leaving the file untouched) if the
    /// database is heterogeneous under the old password.
    pub fn change_main<P: Prompter>(&self, prompter: &mut P) -> Result<Outcome<()>> {
        let mut db = self.open_primary(LockMode::Exclusive)?;
        let Some(old_main) = self.resolve_main(prompter)? else {
            return Ok(Outcome::Cancelled);
        };
        let new_main = match prompter.read_password_with_confirmation(labels::NEW_MAIN_PASSWORD, labels::CONFIRM_NEW_MAIN_PASSWORD)? {
            PromptOutcome::Password(p) => p,
            PromptOutcome::Eof => return Err(Error::ConfirmationMismatch),
        };

        let wf = self.config.work_factor;
        // Heterogeneity check before touching anything: if any entry
        // fails to open under the old password, no rewrap happens.
        self.open_all_homogeneous(&db, old_main.as_bytes())?;

        let mut rewrapped = Vec::with_capacity(db.entries.len());
        for sealed in &db.entries {
            rewrapped.push(entry::rewrap(sealed, old_main.as_bytes(), new_main.as_bytes(), wf, wf)?);
        }
        db.entries = rewrapped;
        db.store()?;
        Ok(Outcome::Completed(()))
    }

    /// `generate`: like [`Engine::set`], but the value is produced by
    /// [`generate::generate`] instead of supplied by the caller.
    pub fn generate<P: Prompter>(&self, prompter: &mut P, space: &[u8], key: &[u8], length: usize) -> Result<Outcome<Vec<u8>>> {
        let mut db = self.open_primary(LockMode::Exclusive)?;
        let Some(main) = self.resolve_main(prompter)? else {
            return Ok(Outcome::Cancelled);
        };
        let opened = self.open_all_homogeneous(&db, main.as_bytes())?;
        if Self::find(&opened, space, key).is_some() {
            return Err(Error::Duplicate { space: display(space), key: display(key) });
        }

        let value = generate::generate(length, generate::DEFAULT_CHARSET)?;
        let sealed = OpenEntry::new(space.to_vec(), key.to_vec(), value.clone()).seal(main.as_bytes(), self.config.work_factor)?;
        db.entries.push(sealed);
        db.store()?;
        Ok(Outcome::Completed(value))
    }
}

fn display(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
