//! The per-thread file processing loop.
//!
//! A [`Worker`] owns one read buffer and one classifier per comment grammar,
//! all reused across every file it claims. It pulls files from a shared
//! [`WorkDistributor`] until the list is exhausted, reads each file
//! sequentially in `chunk_size` pieces, and publishes the file's statistics
//! into its record.
//!
//! # Unreadable files
//!
//! A file that cannot be opened or read counts as a file with zero lines.
//! The failure is logged at `debug` and tallied, never propagated.

use std::fs;
use std::io::{self, Read};

use cloc_core::{CommentStyle, Stats};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::classifier::{CStyleClassifier, LineAutomaton, LineCounter, NestedClassifier};
use crate::distributor::WorkDistributor;
use crate::registry::File;
use crate::stats::ScanStats;

/// What one worker did during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Worker index within the pool.
    pub index: usize,
    /// Files claimed.
    pub files: u64,
    /// Bytes read.
    pub bytes: u64,
    /// Claimed files that could not be read.
    pub unreadable: u64,
}

/// A file-processing worker.
///
/// # Examples
///
/// ```
/// use cloc_core::{DistributorKind, Language};
/// use cloc_scanner::{Arena, FileRegistry, ScanStats, WorkDistributor, Worker};
///
/// let arena = Arena::with_capacity(4096);
/// let mut registry = FileRegistry::new(&arena);
/// registry.register("/does/not/exist.c", Language::C)?;
///
/// let distributor = WorkDistributor::new(&registry, DistributorKind::LockFree);
/// let progress = ScanStats::new();
/// let summary = Worker::new(0, 4096).run(&distributor, &progress);
///
/// assert_eq!(summary.files, 1);
/// assert_eq!(summary.unreadable, 1);
/// # Ok::<(), cloc_scanner::ArenaError>(())
/// ```
#[derive(Debug)]
pub struct Worker {
    index: usize,
    buffer: Box<[u8]>,
    c_style: CStyleClassifier,
    nested: NestedClassifier,
}

impl Worker {
    /// Creates a worker with a `chunk_size`-byte read buffer.
    ///
    /// A zero `chunk_size` is raised to one byte.
    #[must_use]
    pub fn new(index: usize, chunk_size: usize) -> Self {
        Self {
            index,
            buffer: vec![0; chunk_size.max(1)].into_boxed_slice(),
            c_style: CStyleClassifier::new(),
            nested: NestedClassifier::new(),
        }
    }

    /// Processes files until the distributor is exhausted.
    pub fn run(&mut self, distributor: &WorkDistributor<'_, '_>, progress: &ScanStats) -> WorkerSummary {
        let mut summary = WorkerSummary {
            index: self.index,
            ..WorkerSummary::default()
        };

        while let Some(file) = distributor.take_next() {
            summary.files += 1;

            let stats = match self.count_file(file) {
                Ok((stats, bytes)) => {
                    trace!(
                        worker = self.index,
                        path = file.path,
                        lines = stats.lines(),
                        "Counted file"
                    );
                    summary.bytes += bytes;
                    progress.record_file(bytes, stats.lines());
                    stats
                }
                Err(err) => {
                    debug!(worker = self.index, path = file.path, error = %err, "Unreadable file");
                    summary.unreadable += 1;
                    progress.increment_unreadable();
                    Stats::for_file()
                }
            };

            if file.publish(stats).is_err() {
                error!(path = file.path, "File statistics published twice");
            }
        }

        debug!(
            worker = self.index,
            files = summary.files,
            bytes = summary.bytes,
            "Worker finished"
        );
        summary
    }

    fn count_file(&mut self, file: &File<'_>) -> io::Result<(Stats, u64)> {
        match file.language.comment_style() {
            CommentStyle::CStyle => read_file(&mut self.c_style, &mut self.buffer, file.path),
            CommentStyle::NestedCStyle => read_file(&mut self.nested, &mut self.buffer, file.path),
        }
    }
}

/// Reads `path` from start to the size it had when opened.
fn read_file<A: LineAutomaton>(
    automaton: &mut A,
    buffer: &mut [u8],
    path: &str,
) -> io::Result<(Stats, u64)> {
    let mut handle = fs::File::open(path)?;
    let size = handle.metadata()?.len();
    let mut counter = LineCounter::new(automaton);
    let mut offset = 0_u64;

    while offset < size {
        let want = usize::try_from(size - offset).map_or(buffer.len(), |rest| rest.min(buffer.len()));
        let read = match handle.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        counter.feed(&buffer[..read]);
        offset += read as u64;
    }

    Ok((counter.finish(), offset))
}
