//! File filtering for scans.
//!
//! This module provides:
//! - [`FileFilter`]: an injected `(path, size) -> bool` predicate deciding
//!   whether a file's bytes count toward any aggregate
//! - [`Exclusions`]: glob-based exclusion of whole paths (files or folders)
//! - [`FilterOptions`]: the caller-facing bundle of both, plus the
//!   `apply_to_subfolders` toggle that decides whether the file predicate is
//!   propagated into recursive aggregation or only applied to a folder's
//!   immediate files

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

type Predicate = dyn Fn(&Path, u64) -> bool + Send + Sync;

/// A pure, side-effect-free predicate over `(path, size)` of a regular file.
#[derive(Clone)]
pub struct FileFilter {
    predicate: Arc<Predicate>,
}

impl FileFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Path, u64) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Keeps files of at least `min_bytes`.
    pub fn min_size(min_bytes: u64) -> Self {
        Self::new(move |_, size| size >= min_bytes)
    }

    pub fn allows(&self, path: &Path, size: u64) -> bool {
        (self.predicate)(path, size)
    }

    /// Combines two filters; a file must pass both.
    pub fn and(self, other: FileFilter) -> Self {
        Self::new(move |path, size| self.allows(path, size) && other.allows(path, size))
    }
}

impl fmt::Debug for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileFilter").finish_non_exhaustive()
    }
}

/// Compiled exclusion patterns.
///
/// A path is excluded when it matches one of the glob patterns, or when its
/// file name equals one of the raw patterns verbatim.
#[derive(Clone, Debug)]
pub struct Exclusions {
    set: Arc<GlobSet>,
    names: Arc<[String]>,
}

impl Exclusions {
    /// Expands and compiles user-supplied patterns.
    ///
    /// # Errors
    /// Returns an error if any expanded pattern is not a valid glob.
    pub fn from_patterns(patterns: &[String]) -> Result<Self> {
        let expanded = expand_exclude_patterns(patterns);
        let set = build_exclude_matcher(&expanded)?;
        let names: Vec<String> = patterns.iter().map(|p| p.trim().to_string()).collect();
        Ok(Self {
            set: Arc::new(set),
            names: names.into(),
        })
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.set.is_match(path) {
            return true;
        }
        path.file_name()
            .map(|name| self.names.iter().any(|n| name == n.as_str()))
            .unwrap_or(false)
    }
}

/// Expands exclude patterns into common glob forms:
/// For example, "node_modules" becomes:
///   - `**/node_modules`
///   - `**/node_modules/**`
///     unless the pattern already includes glob symbols or extensions.
pub fn expand_exclude_patterns(patterns: &[String]) -> Vec<String> {
    let mut expanded = Vec::new();

    for pat in patterns {
        let pat = pat.trim();
        if pat.is_empty() {
            continue;
        }
        if pat.contains('*') || pat.ends_with('/') || pat.contains('.') {
            expanded.push(pat.to_string());
        } else {
            expanded.push(format!("**/{}", pat));
            expanded.push(format!("**/{}/**", pat));
        }
    }

    expanded
}

/// Compiles a list of glob patterns into a `GlobSet` matcher.
pub fn build_exclude_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid glob pattern: '{}'", pattern))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build glob set")
}

/// Caller-facing filter configuration for one scan.
///
/// # Fields
/// * `min_size_bytes` - Files smaller than this never become items; when
///   `apply_to_subfolders` is set they also stop counting toward folder totals
/// * `apply_to_subfolders` - Propagate the file predicate into recursive
///   aggregation instead of applying it to immediate files only
/// * `hide_empty_dirs` - Drop directory items whose total is zero
/// * `predicate` - Optional extra predicate combined with the size threshold
/// * `exclusions` - Paths skipped entirely, at every depth
#[derive(Clone, Debug, Default)]
pub struct FilterOptions {
    pub min_size_bytes: u64,
    pub apply_to_subfolders: bool,
    pub hide_empty_dirs: bool,
    pub predicate: Option<FileFilter>,
    pub exclusions: Option<Exclusions>,
}

impl FilterOptions {
    pub fn min_size(min_size_bytes: u64, apply_to_subfolders: bool) -> Self {
        Self {
            min_size_bytes,
            apply_to_subfolders,
            ..Default::default()
        }
    }

    /// The predicate for a folder's immediate files, if any filtering applies.
    pub fn file_filter(&self) -> Option<FileFilter> {
        let threshold = (self.min_size_bytes > 0).then(|| FileFilter::min_size(self.min_size_bytes));
        match (threshold, self.predicate.clone()) {
            (Some(a), Some(b)) => Some(a.and(b)),
            (Some(a), None) => Some(a),
            (None, b) => b,
        }
    }

    /// The predicate used inside recursive aggregation.
    pub fn aggregation_filter(&self) -> Option<FileFilter> {
        if self.apply_to_subfolders {
            self.file_filter()
        } else {
            None
        }
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclusions
            .as_ref()
            .map(|ex| ex.is_excluded(path))
            .unwrap_or(false)
    }
}
