//! Core types, configuration, and errors for the cloc line counter.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Domain types ([`Language`], [`CommentStyle`], [`LineKind`], [`Stats`], [`FileId`])
//! - Configuration structures ([`Config`], [`ScanConfig`], [`ReportConfig`])
//! - Configuration errors, collected rather than fail-fast
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{
    Config, DEFAULT_ARENA_CAPACITY, DEFAULT_CHUNK_SIZE, DEFAULT_SCRATCH_CAPACITY,
    DistributorKind, ReportConfig, ReportMode, ScanConfig, SortKey,
};
pub use error::{ConfigError, ConfigErrors};
pub use hash::{FxHashMap, FxHashSet, fx_hash_map_with_capacity, fx_hash_set_with_capacity};
pub use types::{CommentStyle, FileId, Language, LineKind, Stats, StatsRow};
