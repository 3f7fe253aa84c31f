//! Line classifications and the counters they accumulate into.
//!
//! [`Stats`] is used for a single file as well as for any aggregate of
//! files. Aggregation is plain field-wise addition, so per-file, per-language
//! and grand totals are all the same type.

use std::iter::Sum;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use super::language::Language;

/// The classification of one physical line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Only whitespace (bytes with value 32 or below).
    #[default]
    Blank,

    /// Comment text with no code outside the comment.
    Comment,

    /// At least one printable byte outside any comment.
    Code,
}

/// Blank, comment and code line counters for a file or a group of files.
///
/// For a single file `blank + comment + code` equals its physical line count
/// and `files` is 1. For an aggregate every field is the sum of its
/// constituents.
///
/// # Examples
///
/// ```
/// use cloc_core::{LineKind, Stats};
///
/// let mut stats = Stats::default();
/// stats.record(LineKind::Code);
/// stats.record(LineKind::Comment);
/// stats.record(LineKind::Blank);
///
/// assert_eq!(stats.lines(), 3);
/// assert_eq!(stats.code, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stats {
    /// Whitespace-only lines.
    pub blank: u64,

    /// Comment-only lines.
    pub comment: u64,

    /// Lines containing code.
    pub code: u64,

    /// Number of files contributing to these counters.
    pub files: u64,
}

impl Stats {
    /// Creates counters for a single file with no lines yet.
    #[inline]
    #[must_use]
    pub const fn for_file() -> Self {
        Self {
            blank: 0,
            comment: 0,
            code: 0,
            files: 1,
        }
    }

    /// Counts one line of the given kind.
    #[inline]
    pub fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Blank => self.blank += 1,
            LineKind::Comment => self.comment += 1,
            LineKind::Code => self.code += 1,
        }
    }

    /// Adds every counter of `other` into `self`.
    #[inline]
    pub fn add(&mut self, other: &Self) {
        self.blank += other.blank;
        self.comment += other.comment;
        self.code += other.code;
        self.files += other.files;
    }

    /// Returns the total number of physical lines.
    #[inline]
    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.blank + self.comment + self.code
    }

    /// Returns `true` if no lines were counted.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines() == 0
    }
}

impl AddAssign<&Stats> for Stats {
    #[inline]
    fn add_assign(&mut self, rhs: &Stats) {
        self.add(rhs);
    }
}

impl AddAssign for Stats {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.add(&rhs);
    }
}

impl Sum for Stats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, stats| {
            acc += stats;
            acc
        })
    }
}

impl<'a> Sum<&'a Stats> for Stats {
    fn sum<I: Iterator<Item = &'a Stats>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, stats| {
            acc += stats;
            acc
        })
    }
}

/// One labelled line of a report.
///
/// In per-file mode `label` is the file's absolute path; in per-language mode
/// it is the language name. The grand total row is labelled
/// [`StatsRow::TOTAL_LABEL`] and carries no language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRow {
    /// Path or language name.
    pub label: String,

    /// The row's language, if it has a single one.
    pub language: Option<Language>,

    /// Counters for this row.
    pub stats: Stats,
}

impl StatsRow {
    /// Label used for the grand total row.
    pub const TOTAL_LABEL: &'static str = "Total";

    /// Creates a per-language row labelled with the language's name.
    #[must_use]
    pub fn for_language(language: Language, stats: Stats) -> Self {
        Self {
            label: language.name().to_owned(),
            language: Some(language),
            stats,
        }
    }

    /// Creates a per-file row labelled with the file's path.
    #[must_use]
    pub fn for_file(path: impl Into<String>, language: Language, stats: Stats) -> Self {
        Self {
            label: path.into(),
            language: Some(language),
            stats,
        }
    }

    /// Creates the grand total row.
    #[must_use]
    pub fn total(stats: Stats) -> Self {
        Self {
            label: Self::TOTAL_LABEL.to_owned(),
            language: None,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(blank: u64, comment: u64, code: u64, files: u64) -> Stats {
        Stats {
            blank,
            comment,
            code,
            files,
        }
    }

    #[test]
    fn test_record_each_kind() {
        let mut s = Stats::for_file();
        s.record(LineKind::Blank);
        s.record(LineKind::Blank);
        s.record(LineKind::Comment);
        s.record(LineKind::Code);
        assert_eq!(s, stats(2, 1, 1, 1));
        assert_eq!(s.lines(), 4);
    }

    #[test]
    fn test_add_is_field_wise() {
        let mut a = stats(1, 2, 3, 1);
        a.add(&stats(10, 20, 30, 2));
        assert_eq!(a, stats(11, 22, 33, 3));
    }

    #[test]
    fn test_sum_owned_and_borrowed() {
        let all = [stats(1, 0, 0, 1), stats(0, 1, 0, 1), stats(0, 0, 1, 1)];
        let by_ref: Stats = all.iter().sum();
        let by_value: Stats = all.into_iter().sum();
        assert_eq!(by_ref, stats(1, 1, 1, 3));
        assert_eq!(by_ref, by_value);
    }

    #[test]
    fn test_empty_file_is_empty() {
        let s = Stats::for_file();
        assert!(s.is_empty());
        assert_eq!(s.files, 1);
    }

    #[test]
    fn test_line_kind_default_is_blank() {
        assert_eq!(LineKind::default(), LineKind::Blank);
    }

    #[test]
    fn test_rows() {
        let row = StatsRow::for_language(Language::Cpp, stats(0, 0, 5, 1));
        assert_eq!(row.label, "C++");
        assert_eq!(row.language, Some(Language::Cpp));

        let total = StatsRow::total(stats(0, 0, 5, 1));
        assert_eq!(total.label, "Total");
        assert_eq!(total.language, None);
    }

    #[test]
    fn test_stats_serialization() {
        insta::assert_snapshot!(
            serde_json::to_string(&stats(1, 2, 3, 1)).unwrap(),
            @r#"{"blank":1,"comment":2,"code":3,"files":1}"#
        );
    }
}
