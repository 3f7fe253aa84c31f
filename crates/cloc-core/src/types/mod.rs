//! Domain types for the cloc line counter.
//!
//! # Module Organization
//!
//! - [`file`] - Handles for discovered files
//! - [`language`] - Supported languages and their comment grammars
//! - [`stats`] - Line classifications and counters
//!
//! All public types are re-exported at this module level and at the crate
//! root:
//!
//! ```
//! use cloc_core::{FileId, Language, LineKind, Stats};
//! use cloc_core::types::CommentStyle;
//! ```

pub mod file;
pub mod language;
pub mod stats;

pub use file::FileId;
pub use language::{CommentStyle, Language};
pub use stats::{LineKind, Stats, StatsRow};
