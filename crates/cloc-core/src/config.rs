//! Configuration structures for the cloc line counter.
//!
//! This module provides configuration types for every stage of a run:
//!
//! - [`ScanConfig`] - Inputs, exclusions, parallelism and memory budgets
//! - [`ReportConfig`] - Report grouping and ordering
//! - [`Config`] - Root configuration combining both, loadable from JSON
//!
//! All configuration types implement [`Default`]. Fields missing from a
//! configuration file fall back to those defaults.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigErrors};

/// Default size of each worker's read buffer (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Default capacity of the long-lived arena (64 MiB).
pub const DEFAULT_ARENA_CAPACITY: usize = 64 * 1024 * 1024;

/// Default capacity of the traversal scratch arena (64 KiB).
pub const DEFAULT_SCRATCH_CAPACITY: usize = 64 * 1024;

/// How workers claim files from the shared list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributorKind {
    /// Compare-and-swap on a shared atomic cursor.
    #[default]
    LockFree,

    /// The same cursor advanced under a mutex.
    Locked,
}

/// How report rows are grouped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// One row per language present in the run.
    #[default]
    Languages,

    /// One row per file.
    Files,
}

/// Column that report rows are ordered by.
///
/// Counts sort descending and names ascending; ties are broken by label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Code lines.
    #[default]
    Code,

    /// Total physical lines.
    Lines,

    /// Number of files.
    Files,

    /// Row label.
    Name,
}

/// Configuration for a scan.
///
/// # Examples
///
/// ```
/// use cloc_core::{DistributorKind, ScanConfig};
///
/// let config = ScanConfig::new(["./src"])
///     .with_exclude(["target", "vendor"])
///     .with_threads(4)
///     .with_distributor(DistributorKind::Locked);
///
/// assert_eq!(config.inputs.len(), 1);
/// assert_eq!(config.exclude.len(), 2);
/// assert_eq!(config.threads, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Files and directories to count.
    pub inputs: Vec<Utf8PathBuf>,

    /// Directories to skip.
    ///
    /// An entry naming an existing directory excludes exactly that
    /// directory. Any other entry excludes every directory with that name.
    pub exclude: Vec<String>,

    /// Number of worker threads.
    /// `None` means one per hardware thread, capped at the file count.
    pub threads: Option<usize>,

    /// Forces a single worker running on the calling thread.
    pub single_threaded: bool,

    /// Whether symbolic links are followed during traversal.
    pub follow_links: bool,

    /// Size in bytes of each worker's read buffer.
    pub chunk_size: usize,

    /// Capacity in bytes of the long-lived arena.
    pub arena_capacity: usize,

    /// Capacity in bytes of the traversal scratch arena.
    pub scratch_capacity: usize,

    /// File claiming strategy.
    pub distributor: DistributorKind,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            exclude: Vec::new(),
            threads: None,
            single_threaded: false,
            follow_links: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
            distributor: DistributorKind::default(),
        }
    }
}

impl ScanConfig {
    /// Creates a configuration counting `inputs` with default settings.
    #[must_use]
    pub fn new<I, P>(inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Adds directories to exclude.
    #[must_use]
    pub fn with_exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(exclude.into_iter().map(Into::into));
        self
    }

    /// Sets an explicit worker count.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Forces (or stops forcing) a single worker.
    #[must_use]
    pub const fn with_single_threaded(mut self, single: bool) -> Self {
        self.single_threaded = single;
        self
    }

    /// Configures whether to follow symbolic links.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Sets the per-worker read buffer size.
    #[must_use]
    pub const fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Sets the long-lived arena capacity.
    #[must_use]
    pub const fn with_arena_capacity(mut self, bytes: usize) -> Self {
        self.arena_capacity = bytes;
        self
    }

    /// Sets the scratch arena capacity.
    #[must_use]
    pub const fn with_scratch_capacity(mut self, bytes: usize) -> Self {
        self.scratch_capacity = bytes;
        self
    }

    /// Selects the file claiming strategy.
    #[must_use]
    pub const fn with_distributor(mut self, kind: DistributorKind) -> Self {
        self.distributor = kind;
        self
    }

    /// Checks the configuration, collecting every problem found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrors`] listing each missing input, nonexistent
    /// path and out-of-range option.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloc_core::ScanConfig;
    ///
    /// let errors = ScanConfig::default().with_chunk_size(0).validate().unwrap_err();
    /// assert_eq!(errors.len(), 2);
    /// ```
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut errors = Vec::new();

        if self.inputs.is_empty() {
            errors.push(ConfigError::NoInputs);
        }
        errors.extend(
            self.inputs
                .iter()
                .filter(|path| !path_exists(path))
                .map(|path| ConfigError::PathNotFound(path.clone())),
        );

        if self.threads == Some(0) {
            errors.push(ConfigError::invalid_option("threads", "must be at least 1"));
        }
        if self.chunk_size == 0 {
            errors.push(ConfigError::invalid_option(
                "chunk_size",
                "must be at least 1 byte",
            ));
        }
        if self.arena_capacity == 0 {
            errors.push(ConfigError::invalid_option(
                "arena_capacity",
                "must be at least 1 byte",
            ));
        }
        if self.scratch_capacity == 0 {
            errors.push(ConfigError::invalid_option(
                "scratch_capacity",
                "must be at least 1 byte",
            ));
        }
        if self.exclude.iter().any(String::is_empty) {
            errors.push(ConfigError::invalid_option(
                "exclude",
                "entries must not be empty",
            ));
        }

        ConfigErrors::new(errors).map_or(Ok(()), Err)
    }
}

/// Follows symlinks, so a dangling link counts as missing.
fn path_exists(path: &Utf8Path) -> bool {
    path.try_exists().unwrap_or(false)
}

/// Configuration for report construction.
///
/// # Examples
///
/// ```
/// use cloc_core::{ReportConfig, ReportMode, SortKey};
///
/// let config = ReportConfig::default();
/// assert_eq!(config.mode, ReportMode::Languages);
/// assert_eq!(config.sort, SortKey::Code);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Row grouping.
    pub mode: ReportMode,

    /// Row ordering.
    pub sort: SortKey,
}

/// Root configuration for the cloc line counter.
///
/// # Examples
///
/// ```
/// use cloc_core::Config;
///
/// // Create with defaults
/// let config = Config::default();
///
/// // Serialize to JSON
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("\"chunk_size\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan configuration.
    pub scan: ScanConfig,

    /// Report configuration.
    pub report: ReportConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Checks the whole configuration, collecting every problem found.
    ///
    /// # Errors
    ///
    /// See [`ScanConfig::validate`].
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        self.scan.validate()
    }
}
