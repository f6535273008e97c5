//! Parallel scan engine: traverses entries in document order, applying a
//! predicate across a pool of worker threads while preserving
//! first-match-in-order semantics and isolating per-entry failures.
//!
//! Generalizes the teacher's `streaming::parallel` bounded-concurrency
//! pool. That pool ordered async tasks by index to reassemble a stream;
//! this one orders OS threads by index to implement early-exit
//! cancellation, using the same "shared best index, atomic cancellation
//! boundary" shape.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::entry::SealedEntry;
use crate::error::Error;

/// Number of worker threads to use for a scan.
///
/// `Auto` resolves to [`std::thread::available_parallelism`], clamped to
/// the number of entries being scanned (never spawn more workers than
/// there is work), mirroring the teacher's `Threads::Auto` convention.
#[derive(Debug, Clone, Copy)]
pub enum Jobs {
    Auto,
    Fixed(usize),
}

impl Jobs {
    fn resolve(self, entry_count: usize) -> usize {
        let requested = match self {
            Jobs::Auto => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            Jobs::Fixed(n) => n.max(1),
        };
        requested.min(entry_count).max(1)
    }
}

/// The outcome of opening one entry during a scan: either it opened
/// successfully, or it failed (HMAC mismatch, decrypt failure, etc) —
/// recorded, never treated as fatal to the scan itself.
pub enum Opened<T> {
    Ok(T),
    Failed(Error),
}

/// Runs `open` across every entry in `entries`, in document order,
/// returning every successfully-opened result in document order. Used by
/// `list` and `check`: per-entry failures are recorded (available via
/// `on_failure`) but never abort the scan.
pub fn scan_all<T, F>(entries: &[SealedEntry], jobs: Jobs, open: F, mut on_failure: impl FnMut(usize, &Error)) -> Vec<(usize, T)>
where
    T: Send,
    F: Fn(&SealedEntry) -> Result<T, Error> + Sync,
{
    let worker_count = jobs.resolve(entries.len());
    let results: Vec<Mutex<Option<Opened<T>>>> = (0..entries.len()).map(|_| Mutex::new(None)).collect();
    let next_index = AtomicUsize::new(0);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .build()
        .expect("thread pool construction with a bounded, nonzero count cannot fail");

    pool.scope(|scope| {
        for _ in 0..worker_count {
            scope.spawn(|_| loop {
                let i = next_index.fetch_add(1, Ordering::SeqCst);
                if i >= entries.len() {
                    break;
                }
                let outcome = match open(&entries[i]) {
                    Ok(v) => Opened::Ok(v),
                    Err(e) => Opened::Failed(e),
                };
                *results[i].lock().expect("scan result mutex poisoned") = Some(outcome);
            });
        }
    });

    let mut out = Vec::new();
    for (i, slot) in results.into_iter().enumerate() {
        match slot.into_inner().expect("scan result mutex poisoned").expect("every index is visited exactly once") {
            Opened::Ok(v) => out.push((i, v)),
            Opened::Failed(e) => on_failure(i, &e),
        }
    }
    out
}

/// Runs `matches` across every entry in `entries`, in parallel, returning
/// the *first* (lowest-index) entry for which it returns `Ok(true)`.
///
/// Implements §4.9's early-exit contract: once a candidate at index `i`
/// is confirmed, workers examining indices `> i` stop claiming new work;
/// workers already examining indices `< i` are allowed to finish, and a
/// lower-index match found after a higher-index one overrides it. Every
/// per-entry failure (`matches` returning `Err`) is isolated — it does
/// not abort the scan, and does not count as a match.
pub fn scan_first<F>(entries: &[SealedEntry], jobs: Jobs, matches: F) -> Option<usize>
where
    F: Fn(&SealedEntry) -> Result<bool, Error> + Sync,
{
    let worker_count = jobs.resolve(entries.len());
    let next_index = AtomicUsize::new(0);
    let best: Mutex<Option<usize>> = Mutex::new(None);
    let cancelled = AtomicBool::new(false);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .build()
        .expect("thread pool construction with a bounded, nonzero count cannot fail");

    pool.scope(|scope| {
        for _ in 0..worker_count {
            scope.spawn(|_| loop {
                if cancelled.load(Ordering::SeqCst) {
                    let known_best = *best.lock().expect("scan best-index mutex poisoned");
                    let i = next_index.load(Ordering::SeqCst);
                    if known_best.is_some_and(|b| i > b) {
                        break;
                    }
                }
                let i = next_index.fetch_add(1, Ordering::SeqCst);
                if i >= entries.len() {
                    break;
                }
                if let Ok(true) = matches(&entries[i]) {
                    let mut guard = best.lock().expect("scan best-index mutex poisoned");
                    if guard.is_none_or(|b| i < b) {
                        *guard = Some(i);
                    }
                    cancelled.store(true, Ordering::SeqCst);
                }
            });
        }
    });

    best.into_inner().expect("scan best-index mutex poisoned")
}
