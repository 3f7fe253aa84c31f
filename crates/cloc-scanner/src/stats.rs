//! Scan progress with atomic counters.
//!
//! This module provides [`ScanStats`] for tracking worker progress and
//! [`StatsSnapshot`] for point-in-time views of it.
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering. Line counts that end up in the report travel through each
//! file's own record; these counters are informational only.
//!
//! # Examples
//!
//! ```
//! use cloc_scanner::ScanStats;
//!
//! let stats = ScanStats::new();
//!
//! // Called by workers as files complete
//! stats.record_file(4096, 120);
//! stats.increment_unreadable();
//!
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.files, 2);
//! assert_eq!(snapshot.lines, 120);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Atomic counters shared by every worker in a run.
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Files claimed and processed, readable or not.
    files: AtomicU64,
    /// Bytes read from disk.
    bytes: AtomicU64,
    /// Physical lines classified.
    lines: AtomicU64,
    /// Files that could not be opened or read.
    unreadable: AtomicU64,
}

impl ScanStats {
    /// Creates a new [`ScanStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one fully processed file.
    #[inline]
    pub fn record_file(&self, bytes: u64, lines: u64) {
        self.files.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
        self.lines.fetch_add(lines, Ordering::Relaxed);
    }

    /// Records a file that could not be read.
    ///
    /// The file still counts as processed.
    #[inline]
    pub fn increment_unreadable(&self) {
        self.files.fetch_add(1, Ordering::Relaxed);
        self.unreadable.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all counters.
    ///
    /// With relaxed ordering the values are only guaranteed to be mutually
    /// consistent once every worker has been joined.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files: self.files.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            lines: self.lines.load(Ordering::Relaxed),
            unreadable: self.unreadable.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of scan progress.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cloc_scanner::StatsSnapshot;
///
/// let snap = StatsSnapshot {
///     files: 10,
///     bytes: 2_000_000,
///     lines: 50_000,
///     unreadable: 1,
/// };
///
/// assert_eq!(snap.readable(), 9);
/// assert!((snap.megabytes_per_second(Duration::from_secs(2)) - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Files processed.
    pub files: u64,
    /// Bytes read.
    pub bytes: u64,
    /// Lines classified.
    pub lines: u64,
    /// Files that could not be read.
    pub unreadable: u64,
}

impl StatsSnapshot {
    /// Returns the number of files that were read successfully.
    #[inline]
    #[must_use]
    pub const fn readable(&self) -> u64 {
        self.files.saturating_sub(self.unreadable)
    }

    /// Returns read throughput in megabytes (10^6 bytes) per second.
    ///
    /// Returns 0.0 for a zero duration.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Acceptable for statistics display
    pub fn megabytes_per_second(&self, elapsed: Duration) -> f64 {
        if elapsed.is_zero() {
            return 0.0;
        }

        self.bytes as f64 / 1_000_000.0 / elapsed.as_secs_f64()
    }

    /// Returns classified lines per second.
    ///
    /// Returns 0.0 for a zero duration.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Acceptable for statistics display
    pub fn lines_per_second(&self, elapsed: Duration) -> f64 {
        if elapsed.is_zero() {
            return 0.0;
        }

        self.lines as f64 / elapsed.as_secs_f64()
    }
}
