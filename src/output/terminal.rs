//! Terminal output formatter for drill-down listings.
//!
//! Prints one listing per call: a header naming the folder and its total,
//! then `[DIR]`/`[FILE]` rows with a human-readable size (binary units via
//! `humansize`) and the item's share of the folder total.

use crate::cli::SortKey;
use crate::data::{ItemKind, ItemSize};
use crate::hierarchy::Frame;
use crate::utils::{percent, rollup, sort_items};
use anyhow::Result;
use humansize::{BINARY, format_size};
use std::io::Write;
use std::path::Path;

/// How listings are ordered and truncated.
#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub sort: SortKey,
    pub top: Option<usize>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            sort: SortKey::Size,
            top: None,
        }
    }
}

/// Writes the listing of one drill level, ordered per `options`.
pub fn write_view<W: Write>(out: &mut W, frame: &Frame, options: &ViewOptions) -> Result<()> {
    let mut items = frame.items.to_vec();
    sort_items(&mut items, options.sort);
    write_listing(out, frame.node.path(), &items, options.top)
}

/// Writes a listing of `items` (already sorted) for `folder` to `out`.
///
/// # Arguments
/// * `folder` - The folder whose children are listed
/// * `items` - The folder's children, in display order
/// * `top` - Show at most this many rows; the remainder becomes "Other"
pub fn write_listing<W: Write>(
    out: &mut W,
    folder: &Path,
    items: &[ItemSize],
    top: Option<usize>,
) -> Result<()> {
    let total: u64 = items.iter().map(|item| item.size).sum();
    writeln!(
        out,
        "{}  ({}, {} items)",
        folder.display(),
        format_size(total, BINARY),
        items.len()
    )?;

    let (shown, rest) = rollup(items, top.unwrap_or(usize::MAX));
    for item in shown {
        let tag = match item.kind {
            ItemKind::Directory => "[DIR] ",
            ItemKind::File => "[FILE]",
        };
        writeln!(
            out,
            "{} {:<12} {:>6.1}%  {}",
            tag,
            format_size(item.size, BINARY),
            percent(item.size, total),
            item.label
        )?;
    }
    if let Some(rest) = rest {
        writeln!(
            out,
            "[...]  {:<12} {:>6.1}%  Other ({} items)",
            format_size(rest.size, BINARY),
            percent(rest.size, total),
            rest.count
        )?;
    }
    Ok(())
}
