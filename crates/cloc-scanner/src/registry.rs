//! The list of files discovered during traversal.
//!
//! Records live in the long-lived [`Arena`] and form a singly linked list
//! through [`FileId`] handles. Registration prepends, so the list head is
//! always the most recently discovered file.
//!
//! Once traversal finishes the registry is only read. Each record's
//! statistics cell is written exactly once, by whichever worker claimed
//! the record.

use std::sync::OnceLock;

use cloc_core::{FileId, Language, Stats};

use crate::arena::Arena;
use crate::error::ArenaError;

/// One discovered file.
#[derive(Debug)]
pub struct File<'a> {
    /// This record's handle.
    pub id: FileId,

    /// The next record in the list, or `None` at the tail.
    pub next: Option<FileId>,

    /// Absolute, canonical path.
    pub path: &'a str,

    /// Language resolved from the path's extension.
    pub language: Language,

    stats: OnceLock<Stats>,
}

impl File<'_> {
    /// Returns the file's statistics once a worker has published them.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> Option<&Stats> {
        self.stats.get()
    }

    /// Publishes the file's statistics.
    ///
    /// # Errors
    ///
    /// Returns the rejected value if statistics were already published.
    pub fn publish(&self, stats: Stats) -> Result<(), Stats> {
        self.stats.set(stats)
    }
}

/// Owner of every [`File`] record in a run.
///
/// # Examples
///
/// ```
/// use cloc_core::Language;
/// use cloc_scanner::{Arena, FileRegistry};
///
/// let arena = Arena::with_capacity(4096);
/// let mut registry = FileRegistry::new(&arena);
/// registry.register("/src/a.c", Language::C)?;
/// registry.register("/src/b.rs", Language::Rust)?;
///
/// let paths: Vec<_> = registry.iter().map(|file| file.path).collect();
/// assert_eq!(paths, ["/src/b.rs", "/src/a.c"]);
/// # Ok::<(), cloc_scanner::ArenaError>(())
/// ```
#[derive(Debug)]
pub struct FileRegistry<'a> {
    arena: &'a Arena,
    records: Vec<&'a File<'a>>,
    head: Option<FileId>,
}

impl<'a> FileRegistry<'a> {
    /// Creates an empty registry allocating from `arena`.
    #[must_use]
    pub const fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            records: Vec::new(),
            head: None,
        }
    }

    /// Copies `path` into the arena and prepends a record for it.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if the arena cannot hold the
    /// record or its path.
    pub fn register(&mut self, path: &str, language: Language) -> Result<FileId, ArenaError> {
        let id = FileId::new(self.records.len());
        let path = self.arena.alloc_str(path)?;
        let file = self.arena.alloc(File {
            id,
            next: self.head,
            path,
            language,
            stats: OnceLock::new(),
        })?;
        self.records.push(file);
        self.head = Some(id);
        Ok(id)
    }

    /// Returns the arena records are allocated from.
    #[inline]
    #[must_use]
    pub const fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Returns the most recently registered file's handle.
    #[inline]
    #[must_use]
    pub const fn head(&self) -> Option<FileId> {
        self.head
    }

    /// Looks up a record by handle.
    #[inline]
    #[must_use]
    pub fn get(&self, id: FileId) -> Option<&'a File<'a>> {
        self.records.get(id.index()).copied()
    }

    /// Returns every record, indexed by [`FileId`].
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[&'a File<'a>] {
        &self.records
    }

    /// Returns the number of registered files.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no file has been registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Walks the list from its head.
    pub fn iter(&self) -> ListIter<'_, 'a> {
        ListIter {
            records: &self.records,
            cursor: self.head,
        }
    }
}

/// Iterator over a [`FileRegistry`] in list order.
#[derive(Debug)]
pub struct ListIter<'r, 'a> {
    records: &'r [&'a File<'a>],
    cursor: Option<FileId>,
}

impl<'a> Iterator for ListIter<'_, 'a> {
    type Item = &'a File<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let file = *self.records.get(self.cursor?.index())?;
        self.cursor = file.next;
        Some(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_prepends() {
        let arena = Arena::with_capacity(4096);
        let mut registry = FileRegistry::new(&arena);
        assert!(registry.is_empty());
        assert_eq!(registry.head(), None);

        let a = registry.register("/a.c", Language::C).unwrap();
        let b = registry.register("/b.go", Language::Go).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.head(), Some(b));
        assert_eq!(registry.get(b).unwrap().next, Some(a));
        assert_eq!(registry.get(a).unwrap().next, None);
    }

    #[test]
    fn test_iter_visits_every_record_once() {
        let arena = Arena::with_capacity(16 * 1024);
        let mut registry = FileRegistry::new(&arena);
        for i in 0..50 {
            registry.register(&format!("/src/{i}.c"), Language::C).unwrap();
        }

        let mut seen: Vec<_> = registry.iter().map(|file| file.id.index()).collect();
        assert_eq!(seen.first(), Some(&49));
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_paths_live_in_the_arena() {
        let arena = Arena::with_capacity(4096);
        let mut registry = FileRegistry::new(&arena);
        let before = arena.committed();
        let id = registry.register("/src/main.rs", Language::Rust).unwrap();
        assert!(arena.committed() > before);
        assert_eq!(registry.get(id).unwrap().path, "/src/main.rs");
    }

    #[test]
    fn test_register_exhausts_arena() {
        let arena = Arena::with_capacity(8);
        let mut registry = FileRegistry::new(&arena);
        assert!(registry.register("/a/very/long/path.c", Language::C).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stats_publish_once() {
        let arena = Arena::with_capacity(4096);
        let mut registry = FileRegistry::new(&arena);
        let id = registry.register("/x.c", Language::C).unwrap();
        let file = registry.get(id).unwrap();

        assert!(file.stats().is_none());
        file.publish(Stats::for_file()).unwrap();
        assert!(file.publish(Stats::default()).is_err());
        assert_eq!(file.stats(), Some(&Stats::for_file()));
    }
}
