//! CLI interface definitions for the `sizetree` application.
//!
//! This module defines command-line arguments using [`clap`] and exposes:
//!
//! - [`Args`]: the main struct parsed from CLI inputs
//! - [`SortKey`]: an enum for sorting listings by `size` or `name`
//!
//! # Example
//!
//! ```bash
//! sizetree ~/projects --min-size 10MB --exclude .git --drill rust/target
//! ```

use crate::filter::{Exclusions, FilterOptions};
use crate::session::ScanConfig;
use crate::thread_pool::{DEFAULT_WORKERS, WorkerStrategy};
use crate::utils::parse_size;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the `sizetree` explorer.
#[derive(Parser, Debug)]
#[command(name = "sizetree", version, about)]
pub struct Args {
    /// Folder to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Hide files smaller than this (e.g. 500KB, 10MB, 1.5GB)
    #[arg(long, value_name = "SIZE", default_value = "0")]
    pub min_size: String,

    /// Also apply the size threshold inside subfolder totals
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub subfolders: bool,

    /// Hide folders whose total is zero
    #[arg(long, default_value_t = false)]
    pub hide_empty: bool,

    /// Exclude entries with matching names (e.g., '.git', 'node_modules')
    #[arg(long, value_name = "PATTERN", num_args = 1.., action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Sort listings by name or size
    #[arg(long, value_enum, default_value_t = SortKey::Size)]
    pub sort: SortKey,

    /// Show at most N rows per listing; the rest are summed as "Other"
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Number of concurrent subfolder workers
    #[arg(long, value_name = "N", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// How the worker count is chosen
    #[arg(long = "workers-strategy", value_enum, default_value_t = WorkerStrategy::Fixed)]
    pub workers_strategy: WorkerStrategy,

    /// Open these subfolders one after another after the root scan (e.g. src/bin)
    #[arg(long, value_name = "A/B/C")]
    pub drill: Option<PathBuf>,

    /// Navigate interactively after the root scan
    #[arg(long, short = 'i', default_value_t = false)]
    pub interactive: bool,

    /// Export the root listing to a CSV file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Cancel the root scan after this many seconds and show partial results
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Args {
    /// Builds the scan filter from the size, subfolder and exclude flags.
    pub fn filter_options(&self) -> Result<FilterOptions> {
        let exclusions = if self.exclude.is_empty() {
            None
        } else {
            Some(Exclusions::from_patterns(&self.exclude)?)
        };
        Ok(FilterOptions {
            min_size_bytes: parse_size(&self.min_size)?,
            apply_to_subfolders: self.subfolders,
            hide_empty_dirs: self.hide_empty,
            predicate: None,
            exclusions,
        })
    }

    /// Builds the library scan configuration from the worker flags.
    pub fn scan_config(&self) -> Result<ScanConfig> {
        Ok(ScanConfig {
            workers: self.workers_strategy.resolve(self.workers)?,
            ..ScanConfig::default()
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// Enum for specifying how to sort listings.
///
/// # Variants
/// * `Name` - Sort entries alphabetically by label
/// * `Size` - Sort entries by size in descending order (largest first)
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum SortKey {
    Name,
    Size,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["sizetree"]);
        assert_eq!(args.path, PathBuf::from("."));
        assert_eq!(args.sort, SortKey::Size);
        assert!(args.subfolders);
        assert_eq!(args.scan_config().unwrap().workers, 16);

        let filter = args.filter_options().unwrap();
        assert_eq!(filter.min_size_bytes, 0);
        assert!(filter.exclusions.is_none());
    }

    #[test]
    fn test_filter_flags() {
        let args = Args::parse_from([
            "sizetree",
            "/data",
            "--min-size",
            "15",
            "--subfolders",
            "false",
            "--exclude",
            "node_modules",
            "--hide-empty",
        ]);
        let filter = args.filter_options().unwrap();
        assert_eq!(filter.min_size_bytes, 15);
        assert!(!filter.apply_to_subfolders);
        assert!(filter.hide_empty_dirs);
        assert!(filter.is_excluded(&PathBuf::from("/data/node_modules")));
    }

    #[test]
    fn test_invalid_min_size() {
        let args = Args::parse_from(["sizetree", "--min-size", "lots"]);
        assert!(args.filter_options().is_err());
    }
}
