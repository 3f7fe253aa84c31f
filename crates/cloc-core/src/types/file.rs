//! Handles for files discovered during traversal.

use serde::{Deserialize, Serialize};

/// An opaque handle to a discovered file.
///
/// The inner value is the file's index in the registry's record table, in
/// discovery order. Records link to each other through these handles rather
/// than through pointers, so the list can be shared read-only across worker
/// threads.
///
/// # Examples
///
/// ```
/// use cloc_core::FileId;
///
/// let id = FileId::new(3);
/// assert_eq!(id.index(), 3);
/// assert_eq!(id, FileId::from(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(usize);

impl FileId {
    /// Creates a handle for the record at `index`.
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the record index this handle refers to.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for FileId {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<FileId> for usize {
    #[inline]
    fn from(id: FileId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_conversions() {
        let id = FileId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(usize::from(id), 42);
        assert_eq!(FileId::from(42_usize), id);
    }

    #[test]
    fn test_file_id_ordering_follows_index() {
        assert!(FileId::new(1) < FileId::new(2));
    }

    #[test]
    fn test_file_id_serializes_transparently() {
        assert_eq!(serde_json::to_string(&FileId::new(7)).unwrap(), "7");
    }
}
