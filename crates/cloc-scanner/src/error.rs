//! Error types for the cloc-scanner crate.
//!
//! This module provides [`ArenaError`] for arena exhaustion and
//! [`ScanError`] for everything that can stop or degrade a scan.

use std::fmt;

use camino::Utf8PathBuf;
use cloc_core::ConfigErrors;

/// Identifies which arena an [`ArenaError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaKind {
    /// The arena holding file records, paths and exclusions for the whole run.
    LongLived,
    /// The arena used for path building during traversal.
    Scratch,
}

impl fmt::Display for ArenaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LongLived => "long-lived",
            Self::Scratch => "scratch",
        })
    }
}

/// Errors raised by the arenas.
///
/// Arenas never grow, so exhaustion is always fatal for the run.
///
/// # Examples
///
/// ```
/// use cloc_scanner::{ArenaError, ArenaKind};
///
/// let err = ArenaError::Exhausted {
///     arena: ArenaKind::Scratch,
///     requested: 128,
///     reserved: 64,
/// };
/// assert_eq!(
///     err.to_string(),
///     "scratch arena exhausted: requested 128 bytes with 64 bytes reserved"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// An allocation would exceed the arena's reserved capacity.
    #[error("{arena} arena exhausted: requested {requested} bytes with {reserved} bytes reserved")]
    Exhausted {
        /// The arena that ran out.
        arena: ArenaKind,
        /// Size of the failed allocation.
        requested: usize,
        /// The arena's total capacity.
        reserved: usize,
    },
}

/// Errors that can occur during scanning operations.
///
/// # Error Recovery Strategy
///
/// - **Configuration errors** ([`ScanError::InvalidConfig`]): Fatal, reported before any work starts
/// - **Arena exhaustion** ([`ScanError::Arena`]): Fatal
/// - **Thread pool errors** ([`ScanError::ThreadPool`]): Fatal
/// - **Input read errors** ([`ScanError::Read`]): Log warning, skip input, continue scan
/// - **Non-UTF-8 paths** ([`ScanError::NonUtf8Path`]): Log warning, skip path, continue scan
///
/// Unreadable files found during traversal never surface as errors: they
/// count as zero lines and are tallied in the progress counters.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The configuration failed validation.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigErrors),

    /// An arena ran out of capacity.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// Failed to inspect or resolve an input path.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The path that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error is recoverable (scanning can continue).
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::NonUtf8Path(_))
    }

    /// Returns `true` if this error is fatal (scanning should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } => Some(path),
            Self::InvalidConfig(_) | Self::Arena(_) | Self::ThreadPool(_) | Self::NonUtf8Path(_) => {
                None
            }
        }
    }
}
