//! Fixed-capacity arenas for run-scoped and traversal-scoped memory.
//!
//! A run uses two arenas:
//!
//! - [`Arena`] holds everything that must outlive traversal: file records,
//!   their absolute paths, and the directory exclusion list. It is backed by
//!   a single [`bumpalo::Bump`] chunk reserved up front and is only ever
//!   released as a whole.
//! - [`ScratchArena`] is the traversal's path-building stack. It hands out
//!   offset-based [`ScratchSpan`] handles and can be rewound to any earlier
//!   [`ScratchMark`] in O(1).
//!
//! Neither arena grows. An allocation that would exceed the reserved
//! capacity fails with [`ArenaError::Exhausted`], which ends the run.
//!
//! # Examples
//!
//! ```
//! use cloc_scanner::{Arena, ScratchArena};
//!
//! let arena = Arena::with_capacity(1024);
//! let path = arena.alloc_str("/src/main.c")?;
//! assert_eq!(path, "/src/main.c");
//!
//! let mut scratch = ScratchArena::with_capacity(256);
//! scratch.push_str("/src")?;
//! let mark = scratch.mark();
//! scratch.push_str("/lib.rs")?;
//! assert_eq!(scratch.as_str(), "/src/lib.rs");
//! scratch.reset_to(mark);
//! assert_eq!(scratch.as_str(), "/src");
//! # Ok::<(), cloc_scanner::ArenaError>(())
//! ```

use std::alloc::Layout;
use std::cell::Cell;
use std::ops::Range;

use bumpalo::Bump;
use tracing::debug;

use crate::error::{ArenaError, ArenaKind};

/// The long-lived arena.
///
/// Allocation is monotonic: `committed` only grows until the arena is
/// destroyed. Values placed in the arena are never dropped individually,
/// so only types without meaningful `Drop` glue should be stored here.
#[derive(Debug)]
pub struct Arena {
    bump: Bump,
    reserved: usize,
    committed: Cell<usize>,
}

impl Arena {
    /// Reserves `capacity` bytes in a single backing chunk.
    ///
    /// The bump allocator is capped at the same capacity, so it can never
    /// fall back to a second chunk.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let bump = Bump::with_capacity(capacity);
        bump.set_allocation_limit(Some(capacity));
        Self {
            bump,
            reserved: capacity,
            committed: Cell::new(0),
        }
    }

    /// Moves `value` into the arena.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if the value does not fit.
    pub fn alloc<T>(&self, value: T) -> Result<&T, ArenaError> {
        let layout = Layout::new::<T>();
        self.commit(layout)?;
        self.bump
            .try_alloc(value)
            .map(|value| &*value)
            .map_err(|_| self.exhausted(layout.size()))
    }

    /// Copies `s` into the arena.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if the string does not fit.
    pub fn alloc_str(&self, s: &str) -> Result<&str, ArenaError> {
        self.commit(Layout::for_value(s))?;
        self.bump
            .try_alloc_str(s)
            .map(|s| &*s)
            .map_err(|_| self.exhausted(s.len()))
    }

    /// Hands out `len` zeroed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if `len` bytes do not fit.
    pub fn allocate(&self, len: usize) -> Result<&mut [u8], ArenaError> {
        let layout = Layout::array::<u8>(len).map_err(|_| self.exhausted(len))?;
        self.commit(layout)?;
        self.bump
            .try_alloc_slice_fill_copy(len, 0_u8)
            .map_err(|_| self.exhausted(len))
    }

    /// Returns the capacity reserved at creation.
    #[inline]
    #[must_use]
    pub const fn reserved(&self) -> usize {
        self.reserved
    }

    /// Returns the number of bytes handed out so far, including alignment
    /// padding.
    #[inline]
    #[must_use]
    pub fn committed(&self) -> usize {
        self.committed.get()
    }

    /// Returns the number of bytes still available.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.reserved - self.committed.get()
    }

    /// Releases the backing chunk and everything allocated from it.
    ///
    /// Dropping the arena has the same effect; this method exists so the
    /// release point is explicit in the run's control flow.
    pub fn destroy(self) {
        debug!(
            reserved = self.reserved,
            committed = self.committed.get(),
            "Releasing arena"
        );
        drop(self.bump);
    }

    fn commit(&self, layout: Layout) -> Result<(), ArenaError> {
        let start = self.committed.get().next_multiple_of(layout.align());
        match start.checked_add(layout.size()) {
            Some(end) if end <= self.reserved => {
                self.committed.set(end);
                Ok(())
            }
            _ => Err(self.exhausted(layout.size())),
        }
    }

    const fn exhausted(&self, requested: usize) -> ArenaError {
        ArenaError::Exhausted {
            arena: ArenaKind::LongLived,
            requested,
            reserved: self.reserved,
        }
    }
}

/// A position in a [`ScratchArena`] that it can later be rewound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScratchMark(usize);

impl ScratchMark {
    /// Returns the committed offset this mark was taken at.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        self.0
    }
}

/// A handle to bytes allocated from a [`ScratchArena`].
///
/// Spans are plain offsets. Once the arena is rewound past a span's start
/// the span no longer refers to the data it was created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchSpan(Range<usize>);

impl ScratchSpan {
    /// Returns the span's length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a zero-length span.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The short-lived, rewindable arena.
///
/// Backed by one buffer allocated at creation. Everything pushed since the
/// last reset is contiguous, which makes the arena double as a string
/// builder: [`as_str`](Self::as_str) returns the concatenation of all live
/// allocations.
#[derive(Debug)]
pub struct ScratchArena {
    buf: String,
    reserved: usize,
    peak: usize,
}

impl ScratchArena {
    /// Reserves `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            reserved: capacity,
            peak: 0,
        }
    }

    /// Appends `s`, returning a handle to the copy.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if `s` does not fit.
    pub fn push_str(&mut self, s: &str) -> Result<ScratchSpan, ArenaError> {
        let start = self.reserve(s.len())?;
        self.buf.push_str(s);
        self.peak = self.peak.max(self.buf.len());
        Ok(ScratchSpan(start..self.buf.len()))
    }

    /// Hands out `len` zeroed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if `len` bytes do not fit.
    pub fn allocate(&mut self, len: usize) -> Result<ScratchSpan, ArenaError> {
        let start = self.reserve(len)?;
        self.buf.extend(std::iter::repeat_n('\0', len));
        self.peak = self.peak.max(self.buf.len());
        Ok(ScratchSpan(start..self.buf.len()))
    }

    /// Resolves a span, or returns `None` if the arena has been rewound
    /// past its end.
    #[must_use]
    pub fn get(&self, span: &ScratchSpan) -> Option<&str> {
        self.buf.get(span.0.clone())
    }

    /// Returns every live allocation as one contiguous string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Records the current committed offset.
    #[inline]
    #[must_use]
    pub fn mark(&self) -> ScratchMark {
        ScratchMark(self.buf.len())
    }

    /// Rewinds to `mark`, invalidating every span allocated after it.
    ///
    /// A mark ahead of the current offset, or one that no longer falls on a
    /// character boundary after an earlier rewind, is ignored. Any other
    /// stale mark still rewinds, so marks should not outlive a
    /// [`reset`](Self::reset).
    #[inline]
    pub fn reset_to(&mut self, mark: ScratchMark) {
        if self.buf.is_char_boundary(mark.0) {
            self.buf.truncate(mark.0);
        }
    }

    /// Rewinds to the start.
    #[inline]
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Returns the capacity reserved at creation.
    #[inline]
    #[must_use]
    pub const fn reserved(&self) -> usize {
        self.reserved
    }

    /// Returns the number of live bytes.
    #[inline]
    #[must_use]
    pub fn committed(&self) -> usize {
        self.buf.len()
    }

    /// Returns the highest committed offset reached.
    #[inline]
    #[must_use]
    pub const fn peak(&self) -> usize {
        self.peak
    }

    fn reserve(&self, len: usize) -> Result<usize, ArenaError> {
        let start = self.buf.len();
        match start.checked_add(len) {
            Some(end) if end <= self.reserved => Ok(start),
            _ => Err(ArenaError::Exhausted {
                arena: ArenaKind::Scratch,
                requested: len,
                reserved: self.reserved,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_alloc_str() {
        let arena = Arena::with_capacity(64);
        let a = arena.alloc_str("hello").unwrap();
        let b = arena.alloc_str("world").unwrap();
        assert_eq!(a, "hello");
        assert_eq!(b, "world");
        assert_eq!(arena.committed(), 10);
        assert_eq!(arena.remaining(), 54);
    }

    #[test]
    fn test_arena_alloc_value_accounts_for_alignment() {
        let arena = Arena::with_capacity(64);
        arena.alloc_str("x").unwrap();
        let value = arena.alloc(7_u64).unwrap();
        assert_eq!(*value, 7);
        // One byte of string, seven of padding, eight of u64.
        assert_eq!(arena.committed(), 16);
    }

    #[test]
    fn test_arena_allocate_zeroed() {
        let arena = Arena::with_capacity(32);
        let bytes = arena.allocate(16).unwrap();
        assert!(bytes.iter().all(|&b| b == 0));
        bytes[0] = 1;
        assert_eq!(arena.committed(), 16);
    }

    #[test]
    fn test_arena_exhaustion() {
        let arena = Arena::with_capacity(8);
        arena.alloc_str("12345678").unwrap();
        let err = arena.alloc_str("9").unwrap_err();
        assert_eq!(
            err,
            ArenaError::Exhausted {
                arena: ArenaKind::LongLived,
                requested: 1,
                reserved: 8,
            }
        );
        // A failed allocation commits nothing.
        assert_eq!(arena.committed(), 8);
        assert!(arena.committed() <= arena.reserved());
    }

    #[test]
    fn test_arena_oversized_request() {
        let arena = Arena::with_capacity(8);
        assert!(arena.allocate(usize::MAX).is_err());
        assert_eq!(arena.committed(), 0);
    }

    #[test]
    fn test_arena_never_grows_past_first_chunk() {
        let arena = Arena::with_capacity(40);
        let chunk = arena.bump.allocated_bytes();

        let mut allocations = 0;
        loop {
            let fits = if allocations % 2 == 0 {
                arena.alloc_str("abc").is_ok()
            } else {
                arena.alloc(u64::MAX).is_ok()
            };
            if !fits {
                break;
            }
            allocations += 1;
        }

        assert!(allocations > 0);
        assert!(arena.committed() <= arena.reserved());
        assert_eq!(arena.bump.allocated_bytes(), chunk);
    }

    #[test]
    fn test_arena_destroy() {
        let arena = Arena::with_capacity(16);
        arena.alloc_str("gone").unwrap();
        arena.destroy();
    }

    #[test]
    fn test_scratch_mark_and_reset_to() {
        let mut scratch = ScratchArena::with_capacity(64);
        scratch.push_str("/root").unwrap();
        let mark = scratch.mark();
        assert_eq!(mark.offset(), 5);

        let span = scratch.push_str("/child").unwrap();
        assert_eq!(scratch.get(&span), Some("/child"));
        assert_eq!(scratch.committed(), 11);

        scratch.reset_to(mark);
        assert_eq!(scratch.committed(), 5);
        assert_eq!(scratch.as_str(), "/root");
        assert_eq!(scratch.get(&span), None);
        assert_eq!(scratch.peak(), 11);
    }

    #[test]
    fn test_scratch_reset_to_future_mark_is_ignored() {
        let mut scratch = ScratchArena::with_capacity(16);
        scratch.push_str("abcd").unwrap();
        let late = scratch.mark();
        scratch.reset();
        scratch.reset_to(late);
        assert_eq!(scratch.committed(), 0);
    }

    #[test]
    fn test_scratch_stale_mark_inside_char_is_ignored() {
        let mut scratch = ScratchArena::with_capacity(16);
        scratch.push_str("abc").unwrap();
        let stale = scratch.mark();
        scratch.reset();

        // Four bytes; offset 3 splits the second character.
        scratch.push_str("\u{e9}\u{e9}").unwrap();
        scratch.reset_to(stale);
        assert_eq!(scratch.as_str(), "\u{e9}\u{e9}");
        assert_eq!(scratch.committed(), 4);
    }

    #[test]
    fn test_scratch_exhaustion() {
        let mut scratch = ScratchArena::with_capacity(4);
        scratch.push_str("abc").unwrap();
        let err = scratch.push_str("de").unwrap_err();
        assert!(matches!(
            err,
            ArenaError::Exhausted {
                arena: ArenaKind::Scratch,
                requested: 2,
                reserved: 4,
            }
        ));
        assert_eq!(scratch.as_str(), "abc");
    }

    #[test]
    fn test_scratch_allocate() {
        let mut scratch = ScratchArena::with_capacity(8);
        let span = scratch.allocate(3).unwrap();
        assert_eq!(span.len(), 3);
        assert_eq!(scratch.get(&span), Some("\0\0\0"));
        assert!(scratch.allocate(6).is_err());
    }

    #[test]
    fn test_scratch_repeated_directory_cycles_do_not_leak() {
        let mut scratch = ScratchArena::with_capacity(32);
        scratch.push_str("/base").unwrap();
        let mark = scratch.mark();
        for name in ["/a", "/bb", "/ccc", "/dddd"] {
            scratch.push_str(name).unwrap();
            scratch.reset_to(mark);
        }
        assert_eq!(scratch.committed(), 5);
        assert_eq!(scratch.peak(), 10);
    }
}
