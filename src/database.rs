//! The database file: an ordered, JSON-encoded list of sealed entries,
//! guarded by a non-blocking advisory lock for the entire
//! read-parse-modify-write cycle.
//!
//! Locking is tied to the lifetime of an open [`Database`]: acquiring one
//! takes the lock immediately (before the file is even read), and the
//! lock is released only when the `Database` (and the `File` it holds
//! open) is dropped — which is also what lets the lock cover a write
//! operation's password prompt, per spec §4.8.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::entry::{SealedEntry, WireEntry};
use crate::error::{Error, Result};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Whether a [`Database`] is opened for reading only or for a
/// read-modify-write cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Shared lock; concurrent readers are allowed, concurrent writers
    /// are not. A missing file is an error.
    Shared,
    /// Exclusive lock; no concurrent reader or writer is allowed. A
    /// missing file is treated as an empty database (the file is created
    /// on [`Database::store`]).
    Exclusive,
}

/// An open database: the parsed entry list, plus the open file handle
/// that holds the advisory lock for as long as this value lives.
pub struct Database {
    path: PathBuf,
    file: File,
    mode: LockMode,
    pub entries: Vec<SealedEntry>,
}

impl Database {
    /// Opens `path`, acquiring a non-blocking lock in `mode` and parsing
    /// existing contents (if any).
    ///
    /// # Errors
    ///
    /// - [`Error::MissingFile`] if `mode` is [`LockMode::Shared`] and the
    ///   path does not exist.
    /// - [`Error::Locked`] if the lock is already held elsewhere.
    /// - [`Error::Corrupt`] if the file exists but isn't a valid entry
    ///   array.
    pub fn open(path: impl AsRef<Path>, mode: LockMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let exists = path.exists();
        if !exists && mode == LockMode::Shared {
            return Err(Error::MissingFile { path: path.display().to_string() });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(mode == LockMode::Exclusive)
            .create(mode == LockMode::Exclusive)
            .open(&path)?;

        let lock_result = match mode {
            LockMode::Shared => FileExt::try_lock_shared(&file),
            LockMode::Exclusive => FileExt::try_lock_exclusive(&file),
        };
        if lock_result.is_err() {
            log::warn!("database lock contended: {}", path.display());
            return Err(Error::Locked { path: path.display().to_string() });
        }

        let entries = if exists {
            let mut buf = Vec::new();
            (&file).read_to_end(&mut buf)?;
            parse(&buf)?
        } else {
            Vec::new()
        };

        Ok(Self { path, file, mode, entries })
    }

    /// Number of entries currently held (sealed, not yet opened).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Atomically replaces the on-disk file with the current entry list:
    /// write to a sibling temp path, `fsync`, then rename over the
    /// original. Requires [`LockMode::Exclusive`].
    pub fn store(&mut self) -> Result<()> {
        debug_assert_eq!(self.mode, LockMode::Exclusive, "store requires an exclusive lock");

        let wire: Vec<WireEntry> = self.entries.iter().map(SealedEntry::to_wire).collect();
        let json = serde_json::to_vec(&wire).map_err(|e| Error::Corrupt(e.to_string()))?;

        let tmp_path = sibling_tmp_path(&self.path);
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&json)?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Parses raw file bytes into a sealed entry list without touching the
/// filesystem or any lock — the same validation [`Database::open`] runs
/// on a file's contents. Exposed for fuzzing untrusted input.
pub fn parse_entries(bytes: &[u8]) -> Result<Vec<SealedEntry>> {
    parse(bytes)
}

fn parse(bytes: &[u8]) -> Result<Vec<SealedEntry>> {
    if bytes.starts_with(&UTF8_BOM) {
        return Err(Error::Corrupt("leading byte-order mark is not permitted".into()));
    }
    if bytes.is_empty() {
        // A zero-length file is equivalent to an empty database. This
        // also covers the file our own exclusive-open path creates when
        // acquiring a write lock on a path that didn't exist yet, before
        // any entries are written to it.
        return Ok(Vec::new());
    }
    let wire: Vec<WireEntry> =
        serde_json::from_slice(bytes).map_err(|e| Error::Corrupt(format!("invalid database JSON: {e}")))?;
    wire.iter().map(SealedEntry::from_wire).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sealed() -> SealedEntry {
        use crate::entry::OpenEntry;
        OpenEntry::new(b"space".to_vec(), b"key".to_vec(), b"value".to_vec())
            .seal(b"main", 10)
            .unwrap()
    }

    #[test]
    fn missing_file_is_error_for_shared_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        assert!(matches!(Database::open(&path, LockMode::Shared), Err(Error::MissingFile { .. })));
    }

    #[test]
    fn missing_file_is_empty_for_exclusive_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let db = Database::open(&path, LockMode::Exclusive).unwrap();
        assert!(db.is_empty());
    }

    #[test]
    fn store_then_open_roundtrips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        {
            let mut db = Database::open(&path, LockMode::Exclusive).unwrap();
            db.entries.push(sample_sealed());
            db.store().unwrap();
        }
        let db = Database::open(&path, LockMode::Shared).unwrap();
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn exclusive_lock_excludes_concurrent_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let _first = Database::open(&path, LockMode::Exclusive).unwrap();
        let second = Database::open(&path, LockMode::Exclusive);
        assert!(matches!(second, Err(Error::Locked { .. })));
    }

    #[test]
    fn shared_lock_excludes_concurrent_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        {
            let mut db = Database::open(&path, LockMode::Exclusive).unwrap();
            db.store().unwrap();
        }
        let _reader = Database::open(&path, LockMode::Shared).unwrap();
        let writer = Database::open(&path, LockMode::Exclusive);
        assert!(matches!(writer, Err(Error::Locked { .. })));
    }

    #[test]
    fn rejects_leading_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"[]");
        fs::write(&path, bytes).unwrap();
        assert!(matches!(Database::open(&path, LockMode::Shared), Err(Error::Corrupt(_))));
    }

    #[test]
    fn rejects_unknown_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, br#"[{"space":"","key":"","value":"","salt":"","iv":"","hmac":"","hmac_salt":"","extra":""}]"#).unwrap();
        assert!(matches!(Database::open(&path, LockMode::Shared), Err(Error::Corrupt(_))));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        {
            let _db = Database::open(&path, LockMode::Exclusive).unwrap();
        }
        let _again = Database::open(&path, LockMode::Exclusive).unwrap();
    }
}
