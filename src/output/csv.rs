//! CSV export of scan results.
//!
//! Writes one row per item with the columns `Name, Path, Type, Size`, where
//! `Type` is `Folder` or `File` and `Size` is the exact byte count.

use crate::data::ItemSize;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io;
use std::path::Path;

/// A single exported row.
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Path")]
    path: String,
    #[serde(rename = "Type")]
    kind: &'static str,
    #[serde(rename = "Size")]
    size: u64,
}

impl<'a> From<&'a ItemSize> for CsvRow<'a> {
    fn from(item: &'a ItemSize) -> Self {
        Self {
            name: &item.label,
            path: item.path.display().to_string(),
            kind: item.kind.as_str(),
            size: item.size,
        }
    }
}

/// Writes `items` as CSV to `writer`, header first.
pub fn write_items<W: io::Write>(items: &[ItemSize], writer: W) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for item in items {
        csv_writer.serialize(CsvRow::from(item))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Exports `items` to the CSV file at `path`.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn export(items: &[ItemSize], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_items(items, file)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    tracing::info!("exported {} rows to {}", items.len(), path.display());
    Ok(())
}
