//! Directory traversal and file registration.
//!
//! This module provides [`FileWalker`], which resolves each input path,
//! recurses through directories with [`std::fs::read_dir`], and registers
//! every file with a recognised extension in the [`FileRegistry`].
//!
//! # Features
//!
//! - Canonicalises every input, so registered paths are absolute
//! - Builds the current path in the [`ScratchArena`], rewinding after each
//!   entry, so traversal allocates nothing that outlives a directory
//! - Skips excluded directories, by exact path or by name
//! - Skips symbolic links unless asked to follow them, and refuses to
//!   follow a link back into a directory it is already inside
//! - Logs and skips unreadable directories and non-UTF-8 names
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use cloc_scanner::{Arena, FileRegistry, FileWalker, ScratchArena};
//!
//! let arena = Arena::with_capacity(1 << 20);
//! let mut registry = FileRegistry::new(&arena);
//! let mut scratch = ScratchArena::with_capacity(64 * 1024);
//!
//! let mut walker = FileWalker::new(&mut registry, &mut scratch, &["target".to_owned()], false)?;
//! walker.register_input(Utf8Path::new("./src"))?;
//! println!("{} files registered", walker.stats().registered);
//! # Ok::<(), cloc_scanner::ScanError>(())
//! ```

use std::fs::{self, FileType};
use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};
use cloc_core::{FxHashSet, Language, fx_hash_set_with_capacity};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::arena::{Arena, ScratchArena};
use crate::error::{ArenaError, ScanError};
use crate::registry::FileRegistry;

/// Traversal counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Files registered for counting.
    pub registered: u64,
    /// Files skipped for having no recognised extension.
    pub ignored: u64,
    /// Directories listed.
    pub directories: u64,
    /// Directories skipped by the exclusion list.
    pub excluded: u64,
    /// Symbolic links skipped.
    pub symlinks_skipped: u64,
}

/// The directory exclusion list.
///
/// A bare name excludes every directory with that name, at any depth. An
/// entry that resolves to an existing directory also excludes exactly that
/// directory, by canonical path.
#[derive(Debug, Default)]
struct Exclusions<'a> {
    paths: FxHashSet<&'a str>,
    names: SmallVec<[&'a str; 4]>,
}

impl<'a> Exclusions<'a> {
    fn build(arena: &'a Arena, entries: &[String]) -> Result<Self, ArenaError> {
        let mut exclusions = Self {
            paths: fx_hash_set_with_capacity(entries.len()),
            names: SmallVec::new(),
        };

        for entry in entries {
            let resolved = fs::canonicalize(entry)
                .ok()
                .filter(|path| path.is_dir())
                .and_then(|path| Utf8PathBuf::from_path_buf(path).ok());

            if let Some(path) = resolved {
                debug!(entry = %entry, path = %path, "Excluding directory");
                exclusions.paths.insert(arena.alloc_str(path.as_str())?);
            }
            if Utf8Path::new(entry).file_name() == Some(entry.as_str()) {
                debug!(entry = %entry, "Excluding directories by name");
                exclusions.names.push(arena.alloc_str(entry)?);
            }
        }

        Ok(exclusions)
    }

    fn matches(&self, path: &str, name: &str) -> bool {
        self.paths.contains(path) || self.names.contains(&name)
    }
}

/// Registers files found under a set of input paths.
#[derive(Debug)]
pub struct FileWalker<'w, 'a> {
    registry: &'w mut FileRegistry<'a>,
    scratch: &'w mut ScratchArena,
    exclusions: Exclusions<'a>,
    follow_links: bool,
    /// Real directories that followed links were entered from.
    link_trail: Vec<PathBuf>,
    stats: WalkStats,
}

impl<'w, 'a> FileWalker<'w, 'a> {
    /// Creates a walker that registers into `registry`.
    ///
    /// The exclusion list is resolved once, here, and stored in the
    /// registry's arena.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if the exclusion list does not fit
    /// in the arena.
    pub fn new(
        registry: &'w mut FileRegistry<'a>,
        scratch: &'w mut ScratchArena,
        exclude: &[String],
        follow_links: bool,
    ) -> Result<Self, ArenaError> {
        let exclusions = Exclusions::build(registry.arena(), exclude)?;
        Ok(Self {
            registry,
            scratch,
            exclusions,
            follow_links,
            link_trail: Vec::new(),
            stats: WalkStats::default(),
        })
    }

    /// Resolves `path` and registers it, or everything beneath it.
    ///
    /// Symbolic links given directly as inputs are always followed.
    ///
    /// # Errors
    ///
    /// - [`ScanError::Read`] if the path cannot be resolved
    /// - [`ScanError::NonUtf8Path`] if the resolved path is not UTF-8
    /// - [`ScanError::Arena`] if an arena is exhausted
    pub fn register_input(&mut self, path: &Utf8Path) -> Result<(), ScanError> {
        let canonical = fs::canonicalize(path).map_err(|err| ScanError::read(path, err))?;
        let canonical = Utf8PathBuf::from_path_buf(canonical).map_err(ScanError::NonUtf8Path)?;
        let metadata = fs::metadata(&canonical).map_err(|err| ScanError::read(path, err))?;

        self.scratch.reset();
        let result = if metadata.is_dir() {
            let name = canonical.file_name().unwrap_or_default();
            if self.exclusions.matches(canonical.as_str(), name) {
                debug!(path = %canonical, "Input directory is excluded");
                self.stats.excluded += 1;
                Ok(())
            } else {
                // The filesystem root canonicalises to "/", which would
                // otherwise double the separator of every child.
                self.scratch
                    .push_str(canonical.as_str().trim_end_matches('/'))?;
                self.visit_directory()
            }
        } else if metadata.is_file() {
            self.scratch.push_str(canonical.as_str())?;
            self.register_file()
        } else {
            debug!(path = %canonical, "Skipping input that is neither file nor directory");
            Ok(())
        };
        self.scratch.reset();
        result
    }

    /// Returns the traversal counters so far.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Lists the directory whose path is the scratch arena's contents.
    fn visit_directory(&mut self) -> Result<(), ScanError> {
        let entries = match fs::read_dir(self.scratch.as_str()) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = self.scratch.as_str(), error = %err, "Skipping unreadable directory");
                return Ok(());
            }
        };
        self.stats.directories += 1;

        let mark = self.scratch.mark();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(path = self.scratch.as_str(), error = %err, "Skipping unreadable entry");
                    continue;
                }
            };
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(
                    path = self.scratch.as_str(),
                    name = %file_name.to_string_lossy(),
                    "Skipping non-UTF-8 name"
                );
                continue;
            };
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!(path = self.scratch.as_str(), name, error = %err, "Skipping entry");
                    continue;
                }
            };

            self.scratch.push_str("/")?;
            self.scratch.push_str(name)?;
            let result = self.visit_entry(name, file_type);
            self.scratch.reset_to(mark);
            result?;
        }

        Ok(())
    }

    /// Handles the entry whose path is the scratch arena's contents.
    fn visit_entry(&mut self, name: &str, file_type: FileType) -> Result<(), ScanError> {
        if file_type.is_symlink() {
            return self.visit_link(name);
        }

        if file_type.is_dir() {
            if self.exclusions.matches(self.scratch.as_str(), name) {
                debug!(path = self.scratch.as_str(), "Excluded directory");
                self.stats.excluded += 1;
                return Ok(());
            }
            self.visit_directory()
        } else if file_type.is_file() {
            self.register_file()
        } else {
            Ok(())
        }
    }

    fn visit_link(&mut self, name: &str) -> Result<(), ScanError> {
        if !self.follow_links {
            debug!(path = self.scratch.as_str(), "Skipping symbolic link");
            self.stats.symlinks_skipped += 1;
            return Ok(());
        }

        let link = Path::new(self.scratch.as_str());
        let Ok(target) = fs::canonicalize(link) else {
            debug!(path = self.scratch.as_str(), "Skipping dangling symbolic link");
            self.stats.symlinks_skipped += 1;
            return Ok(());
        };

        if target.is_file() {
            return self.register_file();
        }
        if !target.is_dir() {
            return Ok(());
        }

        let excluded = self.exclusions.matches(self.scratch.as_str(), name)
            || target.to_str().is_some_and(|path| self.exclusions.paths.contains(path));
        if excluded {
            debug!(path = self.scratch.as_str(), "Excluded directory");
            self.stats.excluded += 1;
            return Ok(());
        }

        let from = link
            .parent()
            .and_then(|parent| fs::canonicalize(parent).ok())
            .unwrap_or_default();
        let cycles = from.starts_with(&target)
            || self.link_trail.iter().any(|dir| dir.starts_with(&target));
        if cycles {
            warn!(path = self.scratch.as_str(), "Skipping symbolic link cycle");
            self.stats.symlinks_skipped += 1;
            return Ok(());
        }

        self.link_trail.push(from);
        let result = self.visit_directory();
        self.link_trail.pop();
        result
    }

    /// Registers the file whose path is the scratch arena's contents.
    fn register_file(&mut self) -> Result<(), ScanError> {
        let path = self.scratch.as_str();
        match Language::from_path(Utf8Path::new(path)) {
            Some(language) => {
                self.registry.register(path, language)?;
                self.stats.registered += 1;
            }
            None => self.stats.ignored += 1,
        }
        Ok(())
    }
}
