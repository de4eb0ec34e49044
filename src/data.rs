//! Data structures for representing sized filesystem items.
//!
//! This module defines the value objects produced by a scan and consumed by
//! the hierarchy cache, the drill stack and the output renderers. Items are
//! immutable once produced and are handed off between threads by value.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// One immediate child of a scanned folder together with its size.
///
/// # Fields
/// * `label` - The basename shown to the user
/// * `path` - The full path, unique within its parent
/// * `size` - Apparent size in bytes (recursive total for directories)
/// * `kind` - Whether the item is a file or a directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ItemSize {
    pub label: String,
    pub path: PathBuf,
    pub size: u64,
    pub kind: ItemKind,
}

impl ItemSize {
    /// Builds an item, deriving the label from the last path component.
    pub fn new(path: PathBuf, size: u64, kind: ItemKind) -> Self {
        let label = label_for(&path);
        Self {
            label,
            path,
            size,
            kind,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == ItemKind::Directory
    }
}

/// Returns the display label for a path: its file name, or the whole path
/// when it has none (e.g. `/`).
pub fn label_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Represents the kind of a sized item.
///
/// # Variants
/// * `File` - A regular file, sized directly
/// * `Directory` - A directory, sized by recursive aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ItemKind {
    File,
    Directory,
}

impl ItemKind {
    /// Returns the label used in listings and exports.
    ///
    /// # Returns
    /// * `"File"` for `ItemKind::File`
    /// * `"Folder"` for `ItemKind::Directory`
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::File => "File",
            ItemKind::Directory => "Folder",
        }
    }
}

/// Payload of a finished scan session.
///
/// `cancelled` is set when the scan stopped early; the items are then the
/// partial results gathered before cancellation was observed.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub items: Vec<ItemSize>,
    pub skipped: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl ScanReport {
    /// Sum of the sizes of all reported items.
    pub fn total_size(&self) -> u64 {
        self.items.iter().map(|item| item.size).sum()
    }
}
