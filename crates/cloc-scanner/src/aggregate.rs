//! Combining per-file statistics into a report.
//!
//! Runs once, after every worker has been joined. Per-language buckets and
//! the grand total are built by field-wise addition; row order comes only
//! from the requested [`SortKey`], never from claim or completion order.

use std::cmp::Ordering;

use cloc_core::{
    FxHashMap, Language, ReportConfig, ReportMode, SortKey, Stats, StatsRow,
    fx_hash_map_with_capacity,
};
use serde::{Deserialize, Serialize};

use crate::registry::FileRegistry;

/// The aggregated result of a run, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// How rows are grouped.
    pub mode: ReportMode,

    /// The order rows are sorted in.
    pub sort: SortKey,

    /// One row per language or per file, depending on `mode`.
    pub rows: Vec<StatsRow>,

    /// Grand total over every file.
    pub total: StatsRow,
}

/// Builds a [`Report`] from a registry whose files have all been counted.
///
/// A file whose statistics were never published contributes nothing.
///
/// # Examples
///
/// ```
/// use cloc_core::{Language, ReportConfig, Stats};
/// use cloc_scanner::{Arena, FileRegistry, aggregate};
///
/// let arena = Arena::with_capacity(4096);
/// let mut registry = FileRegistry::new(&arena);
/// let id = registry.register("/a.c", Language::C)?;
/// let mut stats = Stats::for_file();
/// stats.code = 10;
/// registry.get(id).unwrap().publish(stats).unwrap();
///
/// let report = aggregate(&registry, ReportConfig::default());
/// assert_eq!(report.rows.len(), 1);
/// assert_eq!(report.rows[0].label, "C");
/// assert_eq!(report.total.stats.code, 10);
/// # Ok::<(), cloc_scanner::ArenaError>(())
/// ```
#[must_use]
pub fn aggregate(registry: &FileRegistry<'_>, config: ReportConfig) -> Report {
    let mut buckets: FxHashMap<Language, Stats> = fx_hash_map_with_capacity(Language::COUNT);
    let mut total = Stats::default();

    for file in registry.records() {
        if let Some(stats) = file.stats() {
            *buckets.entry(file.language).or_default() += stats;
            total += stats;
        }
    }

    let mut rows: Vec<StatsRow> = match config.mode {
        ReportMode::Languages => buckets
            .into_iter()
            .map(|(language, stats)| StatsRow::for_language(language, stats))
            .collect(),
        ReportMode::Files => registry
            .records()
            .iter()
            .filter_map(|file| {
                file.stats()
                    .map(|stats| StatsRow::for_file(file.path, file.language, *stats))
            })
            .collect(),
    };

    sort_rows(&mut rows, config.sort);

    Report {
        mode: config.mode,
        sort: config.sort,
        rows,
        total: StatsRow::total(total),
    }
}

/// Sorts rows by `key`: counts descending, names ascending, ties by label.
pub fn sort_rows(rows: &mut [StatsRow], key: SortKey) {
    rows.sort_unstable_by(|a, b| compare(a, b, key).then_with(|| a.label.cmp(&b.label)));
}

fn compare(a: &StatsRow, b: &StatsRow, key: SortKey) -> Ordering {
    match key {
        SortKey::Code => b.stats.code.cmp(&a.stats.code),
        SortKey::Lines => b.stats.lines().cmp(&a.stats.lines()),
        SortKey::Files => b.stats.files.cmp(&a.stats.files),
        SortKey::Name => Ordering::Equal,
    }
}
