//! Exactly-once file claiming for concurrent workers.
//!
//! A [`WorkDistributor`] walks the registry's linked list from its head and
//! hands each record to exactly one caller. Two strategies are available:
//!
//! - [`DistributorKind::LockFree`]: an [`AtomicUsize`] cursor advanced with
//!   compare-and-swap, retried on contention.
//! - [`DistributorKind::Locked`]: the same read-then-advance under a
//!   [`parking_lot::Mutex`].
//!
//! The list is immutable while workers run and the cursor only ever moves
//! toward the tail, so a successful swap from a handle can never be
//! confused with an earlier visit to the same handle.

use std::hint;
use std::sync::atomic::{AtomicUsize, Ordering};

use cloc_core::{DistributorKind, FileId};
use parking_lot::Mutex;

use crate::registry::{File, FileRegistry};

/// Cursor value meaning "no work left".
const EXHAUSTED: usize = usize::MAX;

#[inline]
const fn encode(id: Option<FileId>) -> usize {
    match id {
        Some(id) => id.index(),
        None => EXHAUSTED,
    }
}

#[derive(Debug)]
enum Cursor {
    LockFree(AtomicUsize),
    Locked(Mutex<Option<FileId>>),
}

/// Hands out registered files one at a time.
///
/// `WorkDistributor` is `Sync`; share it by reference across workers.
///
/// # Examples
///
/// ```
/// use cloc_core::{DistributorKind, Language};
/// use cloc_scanner::{Arena, FileRegistry, WorkDistributor};
///
/// let arena = Arena::with_capacity(4096);
/// let mut registry = FileRegistry::new(&arena);
/// registry.register("/a.c", Language::C)?;
/// registry.register("/b.c", Language::C)?;
///
/// let distributor = WorkDistributor::new(&registry, DistributorKind::LockFree);
/// assert_eq!(distributor.take_next().map(|file| file.path), Some("/b.c"));
/// assert_eq!(distributor.take_next().map(|file| file.path), Some("/a.c"));
/// assert!(distributor.take_next().is_none());
/// assert_eq!(distributor.claimed(), 2);
/// # Ok::<(), cloc_scanner::ArenaError>(())
/// ```
#[derive(Debug)]
pub struct WorkDistributor<'r, 'a> {
    records: &'r [&'a File<'a>],
    cursor: Cursor,
    claimed: AtomicUsize,
}

impl<'r, 'a> WorkDistributor<'r, 'a> {
    /// Creates a distributor positioned at the registry's head.
    #[must_use]
    pub fn new(registry: &'r FileRegistry<'a>, kind: DistributorKind) -> Self {
        let head = registry.head();
        let cursor = match kind {
            DistributorKind::LockFree => Cursor::LockFree(AtomicUsize::new(encode(head))),
            DistributorKind::Locked => Cursor::Locked(Mutex::new(head)),
        };

        Self {
            records: registry.records(),
            cursor,
            claimed: AtomicUsize::new(0),
        }
    }

    /// Claims the next unclaimed file, or returns `None` once every file
    /// has been handed out.
    pub fn take_next(&self) -> Option<&'a File<'a>> {
        let file = match &self.cursor {
            Cursor::LockFree(cursor) => self.take_lock_free(cursor),
            Cursor::Locked(cursor) => self.take_locked(cursor),
        }?;
        self.claimed.fetch_add(1, Ordering::Relaxed);
        Some(file)
    }

    /// Returns the number of successful claims so far.
    #[inline]
    #[must_use]
    pub fn claimed(&self) -> usize {
        self.claimed.load(Ordering::Relaxed)
    }

    /// Returns the strategy in use.
    #[must_use]
    pub const fn kind(&self) -> DistributorKind {
        match self.cursor {
            Cursor::LockFree(_) => DistributorKind::LockFree,
            Cursor::Locked(_) => DistributorKind::Locked,
        }
    }

    fn take_lock_free(&self, cursor: &AtomicUsize) -> Option<&'a File<'a>> {
        let mut current = cursor.load(Ordering::Acquire);
        loop {
            if current == EXHAUSTED {
                return None;
            }
            let file = *self.records.get(current)?;
            match cursor.compare_exchange_weak(
                current,
                encode(file.next),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(file),
                Err(observed) => {
                    current = observed;
                    hint::spin_loop();
                }
            }
        }
    }

    fn take_locked(&self, cursor: &Mutex<Option<FileId>>) -> Option<&'a File<'a>> {
        let mut guard = cursor.lock();
        let file = *self.records.get((*guard)?.index())?;
        *guard = file.next;
        Some(file)
    }
}

#[cfg(test)]
mod tests {
    use cloc_core::Language;

    use super::*;
    use crate::arena::Arena;

    fn registry_with(arena: &Arena, count: usize) -> FileRegistry<'_> {
        let mut registry = FileRegistry::new(arena);
        for i in 0..count {
            registry
                .register(&format!("/src/file_{i}.c"), Language::C)
                .unwrap();
        }
        registry
    }

    fn claim_concurrently(kind: DistributorKind, files: usize, workers: usize) -> Vec<usize> {
        let arena = Arena::with_capacity(1024 * 1024);
        let registry = registry_with(&arena, files);
        let distributor = WorkDistributor::new(&registry, kind);
        let claimed = Mutex::new(Vec::with_capacity(files));

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    let mut local = Vec::new();
                    while let Some(file) = distributor.take_next() {
                        local.push(file.id.index());
                    }
                    claimed.lock().extend(local);
                });
            }
        });

        assert_eq!(distributor.claimed(), files);
        let mut ids = claimed.into_inner();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_empty_registry() {
        let arena = Arena::with_capacity(64);
        let registry = FileRegistry::new(&arena);
        for kind in [DistributorKind::LockFree, DistributorKind::Locked] {
            let distributor = WorkDistributor::new(&registry, kind);
            assert!(distributor.take_next().is_none());
            assert_eq!(distributor.claimed(), 0);
        }
    }

    #[test]
    fn test_sequential_order_is_list_order() {
        let arena = Arena::with_capacity(64 * 1024);
        let registry = registry_with(&arena, 5);
        for kind in [DistributorKind::LockFree, DistributorKind::Locked] {
            let distributor = WorkDistributor::new(&registry, kind);
            assert_eq!(distributor.kind(), kind);
            let order: Vec<_> = std::iter::from_fn(|| distributor.take_next())
                .map(|file| file.id.index())
                .collect();
            assert_eq!(order, [4, 3, 2, 1, 0]);
            assert!(distributor.take_next().is_none());
        }
    }

    #[test]
    fn test_lock_free_claims_each_file_exactly_once() {
        for workers in [1, 2, 8, 16] {
            let ids = claim_concurrently(DistributorKind::LockFree, 2000, workers);
            assert_eq!(ids, (0..2000).collect::<Vec<_>>(), "{workers} workers");
        }
    }

    #[test]
    fn test_locked_claims_each_file_exactly_once() {
        for workers in [1, 2, 8, 16] {
            let ids = claim_concurrently(DistributorKind::Locked, 2000, workers);
            assert_eq!(ids, (0..2000).collect::<Vec<_>>(), "{workers} workers");
        }
    }

    #[test]
    fn test_more_workers_than_files() {
        let ids = claim_concurrently(DistributorKind::LockFree, 3, 12);
        assert_eq!(ids, [0, 1, 2]);
    }
}
