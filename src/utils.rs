//! Utility functions for the `sizetree` tool.
//!
//! This module provides:
//! - Human size parsing for `--min-size` style inputs (`15MB`, `1.5 GB`)
//! - Sorting of item lists by size or name
//! - Percentage and "Other" roll-up helpers for listings
//! - Path shortening for one-line status displays

use crate::cli::SortKey;
use crate::data::ItemSize;
use anyhow::{Context, Result, bail};
use std::path::Path;

const KIB: u64 = 1024;

/// Parses a size such as `15`, `15MB`, `1.5 gb` or `10 KB` into bytes.
///
/// Units are binary multiples (`KB` = 1024). A bare number is bytes.
///
/// # Errors
/// Returns an error for negative, non-numeric or unknown-unit input.
pub fn parse_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let split = trimmed
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let value: f64 = number
        .trim()
        .parse()
        .with_context(|| format!("Invalid size: '{}'", input))?;
    if !value.is_finite() || value < 0.0 {
        bail!("Invalid size: '{}'", input);
    }

    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => KIB,
        "M" | "MB" | "MIB" => KIB.pow(2),
        "G" | "GB" | "GIB" => KIB.pow(3),
        "T" | "TB" | "TIB" => KIB.pow(4),
        other => bail!("Unknown size unit '{}' in '{}'", other, input),
    };

    Ok((value * multiplier as f64) as u64)
}

/// Sorts items based on the provided sort key.
///
/// # Behavior
/// * `SortKey::Size` - Largest first, ties broken by label
/// * `SortKey::Name` - By label in ascending order
pub fn sort_items(items: &mut [ItemSize], sort_key: SortKey) {
    match sort_key {
        SortKey::Size => {
            items.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.label.cmp(&b.label)))
        }
        SortKey::Name => items.sort_by(|a, b| a.label.cmp(&b.label)),
    }
}

/// Share of `part` in `total`, as a percentage.
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Items that did not fit in a listing, summed into one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollup {
    pub count: usize,
    pub size: u64,
}

/// Splits `items` into the first `keep` rows and a roll-up of the rest.
pub fn rollup(items: &[ItemSize], keep: usize) -> (&[ItemSize], Option<Rollup>) {
    if items.len() <= keep {
        return (items, None);
    }
    let (head, tail) = items.split_at(keep);
    let rest = Rollup {
        count: tail.len(),
        size: tail.iter().map(|item| item.size).sum(),
    };
    (head, Some(rest))
}

/// Shortens a path for a one-line status display, keeping its tail.
pub fn shorten_path(path: &Path, max_chars: usize) -> String {
    let text = path.display().to_string();
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    let tail: String = text.chars().skip(count - max_chars).collect();
    format!("...{}", tail)
}
