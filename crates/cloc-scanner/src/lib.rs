//! Parallel blank/comment/code line counting engine.
//!
//! This crate discovers source files, counts each one's blank, comment and
//! code lines on a fixed pool of worker threads, and aggregates the results
//! per language or per file.
//!
//! # Overview
//!
//! The main entry point is [`Scanner`], which combines:
//!
//! - [`FileWalker`]: Directory traversal into a [`FileRegistry`]
//! - [`WorkDistributor`]: Exactly-once file claiming across workers
//! - [`Worker`]: Chunked reads through a [`LineAutomaton`] per grammar
//! - [`aggregate`]: Per-language or per-file [`Report`] building
//! - [`ScanStats`]: Atomic counters for progress tracking
//!
//! # Example
//!
//! ```no_run
//! use cloc_core::ScanConfig;
//! use cloc_scanner::Scanner;
//!
//! let scanner = Scanner::new(ScanConfig::new(["./src"]))?;
//! let result = scanner.scan()?;
//!
//! for row in &result.report.rows {
//!     println!("{:<12} {:>8}", row.label, row.stats.code);
//! }
//! println!("{} files on {} threads", result.progress.files, result.threads);
//! # Ok::<(), cloc_scanner::ScanError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! Scanner (run context)
//!     │
//!     ├── Arena (records, paths, exclusions; freed as a whole)
//!     │
//!     ├── FileWalker (single-threaded traversal)
//!     │       │
//!     │       └── ScratchArena (path building)
//!     │
//!     ├── WorkDistributor (lock-free cursor or mutex)
//!     │
//!     ├── Worker × N (rayon ThreadPool::broadcast)
//!     │       │
//!     │       └── CStyleClassifier / NestedClassifier
//!     │
//!     └── aggregate (after the pool joins)
//! ```
//!
//! # Performance
//!
//! - **Memory**: one bump arena per run, one read buffer per worker
//! - **CPU**: one worker per pool thread, no work stealing needed
//! - **Locking**: a single atomic cursor; statistics cells are write-once

#![deny(clippy::all)]
#![warn(missing_docs)]

mod aggregate;
mod arena;
mod classifier;
mod distributor;
mod error;
mod registry;
mod stats;
mod walker;
mod worker;

pub use aggregate::{Report, aggregate, sort_rows};
pub use arena::{Arena, ScratchArena, ScratchMark, ScratchSpan};
pub use classifier::{
    CStyleClassifier, Classifier, Flat, LineAutomaton, LineCounter, Nested, NestedClassifier,
    Nesting, count_bytes,
};
pub use distributor::WorkDistributor;
pub use error::{ArenaError, ArenaKind, ScanError};
pub use registry::{File, FileRegistry, ListIter};
pub use stats::{ScanStats, StatsSnapshot};
pub use walker::{FileWalker, WalkStats};
pub use worker::{Worker, WorkerSummary};

use std::num::NonZeroUsize;
use std::thread;
use std::time::{Duration, Instant};

use cloc_core::{ReportConfig, ScanConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// The aggregated counts.
    pub report: Report,
    /// Final progress counters.
    pub progress: StatsSnapshot,
    /// Traversal counters.
    pub walk: WalkStats,
    /// One summary per worker, in pool index order.
    pub workers: Vec<WorkerSummary>,
    /// Size of the worker pool.
    pub threads: usize,
    /// Wall-clock time from arena creation to the finished report.
    pub elapsed: Duration,
}

/// The line counting run context.
///
/// A `Scanner` owns only its validated configuration. Every run creates its
/// own arenas, registry and pool, and hands them to each component by
/// reference, so one scanner can run any number of scans.
///
/// # Examples
///
/// ```no_run
/// use cloc_core::{ReportConfig, ReportMode, ScanConfig, SortKey};
/// use cloc_scanner::Scanner;
///
/// let scanner = Scanner::new(ScanConfig::new(["."]).with_exclude(["target"]))?;
/// let result = scanner.scan_with(ReportConfig {
///     mode: ReportMode::Files,
///     sort: SortKey::Name,
/// })?;
/// println!("{} files", result.report.rows.len());
/// # Ok::<(), cloc_scanner::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    /// Creates a scanner after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] carrying every problem found.
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the scanner's configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Runs a scan with the default report layout.
    ///
    /// # Errors
    ///
    /// See [`Scanner::scan_with`].
    pub fn scan(&self) -> Result<ScanResult, ScanError> {
        self.scan_with(ReportConfig::default())
    }

    /// Runs a scan and aggregates it as `report` asks.
    ///
    /// Inputs that cannot be resolved are logged and skipped. Unreadable
    /// files count as files with zero lines.
    ///
    /// # Errors
    ///
    /// - [`ScanError::Arena`] if either arena is exhausted
    /// - [`ScanError::ThreadPool`] if the worker pool cannot be built
    pub fn scan_with(&self, report: ReportConfig) -> Result<ScanResult, ScanError> {
        let start = Instant::now();
        let arena = Arena::with_capacity(self.config.arena_capacity);
        let outcome = self.run(&arena, report, start);
        arena.destroy();
        outcome
    }

    fn run(
        &self,
        arena: &Arena,
        report: ReportConfig,
        start: Instant,
    ) -> Result<ScanResult, ScanError> {
        let mut registry = FileRegistry::new(arena);
        let mut scratch = ScratchArena::with_capacity(self.config.scratch_capacity);

        info!(inputs = self.config.inputs.len(), "Traversing inputs");
        let walk = {
            let mut walker = FileWalker::new(
                &mut registry,
                &mut scratch,
                &self.config.exclude,
                self.config.follow_links,
            )?;
            for input in &self.config.inputs {
                match walker.register_input(input) {
                    Ok(()) => {}
                    Err(err) if err.is_recoverable() => {
                        warn!(path = %input, error = %err, "Skipping input");
                    }
                    Err(err) => return Err(err),
                }
            }
            walker.stats()
        };
        info!(
            files = registry.len(),
            ignored = walk.ignored,
            directories = walk.directories,
            excluded = walk.excluded,
            arena_bytes = arena.committed(),
            scratch_peak = scratch.peak(),
            "Traversal complete"
        );

        let threads = self.thread_count(registry.len());
        let distributor = WorkDistributor::new(&registry, self.config.distributor);
        let progress = ScanStats::new();
        let chunk_size = self.config.chunk_size;

        info!(threads, distributor = ?distributor.kind(), "Counting lines");
        let workers = if threads == 1 {
            vec![Worker::new(0, chunk_size).run(&distributor, &progress)]
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|index| format!("cloc-worker-{index}"))
                .build()?;
            pool.broadcast(|ctx| Worker::new(ctx.index(), chunk_size).run(&distributor, &progress))
        };
        debug!(claimed = distributor.claimed(), "Workers joined");

        let report = aggregate(&registry, report);
        let progress = progress.snapshot();
        let elapsed = start.elapsed();
        info!(
            files = progress.files,
            lines = progress.lines,
            unreadable = progress.unreadable,
            elapsed_ms = elapsed.as_millis(),
            "Scan complete"
        );

        Ok(ScanResult {
            report,
            progress,
            walk,
            workers,
            threads,
            elapsed,
        })
    }

    /// Sizes the pool: forced to one, an explicit count, or one thread per
    /// core but never more than there are files.
    fn thread_count(&self, files: usize) -> usize {
        if self.config.single_threaded {
            return 1;
        }
        if let Some(threads) = self.config.threads {
            return threads.max(1);
        }
        thread::available_parallelism()
            .map_or(1, NonZeroUsize::get)
            .min(files)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use camino::Utf8PathBuf;
    use cloc_core::{ConfigError, DistributorKind, Language, ReportMode, SortKey, Stats};
    use tempfile::TempDir;

    use super::*;

    fn tree() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(fs::canonicalize(dir.path()).unwrap()).unwrap();

        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::write(root.join("src/main.c"), "/* header\n * more\n */\nint main() {\n\n  return 0; // ok\n}\n").unwrap();
        fs::write(root.join("src/util.h"), "#pragma once\n// util\n").unwrap();
        fs::write(root.join("src/nested/lib.rs"), "/* a /* b */ c */\nfn f() {}\n\n").unwrap();
        fs::write(root.join("src/notes.txt"), "not counted\n").unwrap();
        fs::write(root.join("build/gen.c"), "int generated;\n").unwrap();

        (dir, root)
    }

    fn config(root: &Utf8PathBuf) -> ScanConfig {
        ScanConfig::new([root.clone()])
            .with_exclude(["build"])
            .with_chunk_size(5)
    }

    #[test]
    fn test_scan_counts_by_language() {
        let (_dir, root) = tree();
        let result = Scanner::new(config(&root)).unwrap().scan().unwrap();

        let rows: Vec<_> = result
            .report
            .rows
            .iter()
            .map(|row| (row.label.as_str(), row.stats))
            .collect();
        assert_eq!(
            rows,
            [
                ("C", Stats { blank: 1, comment: 3, code: 3, files: 1 }),
                ("C Header", Stats { blank: 0, comment: 1, code: 1, files: 1 }),
                ("Rust", Stats { blank: 1, comment: 1, code: 1, files: 1 }),
            ]
        );
        assert_eq!(result.report.total.stats, Stats { blank: 2, comment: 5, code: 5, files: 3 });
        assert_eq!(result.walk.excluded, 1);
        assert_eq!(result.walk.ignored, 1);
        assert_eq!(result.progress.files, 3);
        assert_eq!(result.progress.lines, 12);
    }

    #[test]
    fn test_thread_settings_do_not_change_counts() {
        let (_dir, root) = tree();
        let baseline = Scanner::new(config(&root).with_single_threaded(true))
            .unwrap()
            .scan()
            .unwrap();
        assert_eq!(baseline.threads, 1);
        assert_eq!(baseline.workers.len(), 1);

        for kind in [DistributorKind::LockFree, DistributorKind::Locked] {
            let result = Scanner::new(config(&root).with_threads(4).with_distributor(kind))
                .unwrap()
                .scan()
                .unwrap();
            assert_eq!(result.threads, 4);
            assert_eq!(result.workers.len(), 4);
            assert_eq!(result.workers.iter().map(|w| w.files).sum::<u64>(), 3);
            assert_eq!(result.report, baseline.report);
        }
    }

    #[test]
    fn test_by_file_report_matches_language_total() {
        let (_dir, root) = tree();
        let scanner = Scanner::new(config(&root)).unwrap();
        let by_language = scanner.scan().unwrap();
        let by_file = scanner
            .scan_with(ReportConfig { mode: ReportMode::Files, sort: SortKey::Name })
            .unwrap();

        assert_eq!(by_file.report.rows.len(), 3);
        assert_eq!(by_file.report.rows[0].label, root.join("src/main.c").as_str());
        assert_eq!(by_file.report.rows[1].language, Some(Language::Rust));
        assert_eq!(by_file.report.total, by_language.report.total);
    }

    #[test]
    fn test_thread_count_is_capped_by_files() {
        let (_dir, root) = tree();
        let scanner = Scanner::new(config(&root)).unwrap();
        assert_eq!(scanner.thread_count(0), 1);
        assert_eq!(scanner.thread_count(1), 1);
        assert!(scanner.thread_count(3) <= 3);
    }

    #[test]
    fn test_invalid_config_reports_every_error() {
        let config = ScanConfig::new(["/no/such/input", "/nor/this"]).with_chunk_size(0);
        let err = Scanner::new(config).unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(
            &err,
            ScanError::InvalidConfig(errors)
                if errors.len() == 3
                    && matches!(errors.iter().next(), Some(ConfigError::PathNotFound(_)))
        ));
    }

    #[test]
    fn test_long_lived_arena_exhaustion_is_fatal() {
        let (_dir, root) = tree();
        let scanner = Scanner::new(config(&root).with_arena_capacity(64)).unwrap();
        let err = scanner.scan().unwrap_err();
        assert!(matches!(
            err,
            ScanError::Arena(ArenaError::Exhausted { arena: ArenaKind::LongLived, .. })
        ));
    }

    #[test]
    fn test_result_serializes() {
        let (_dir, root) = tree();
        let result = Scanner::new(config(&root)).unwrap().scan().unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["report"]["total"]["label"], "Total");
        assert_eq!(json["report"]["total"]["stats"]["code"], 5);
        assert_eq!(json["walk"]["registered"], 3);
    }
}
