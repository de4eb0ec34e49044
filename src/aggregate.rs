//! Recursive directory size aggregation.
//!
//! [`aggregate`] walks a subtree depth-first with `WalkDir` (never following
//! links) and sums the apparent sizes of the regular files it finds.
//! Unreadable files and directories contribute zero and are counted as
//! skipped; the walk itself never fails.

use crate::control::ScanContext;
use crate::error::ProbeError;
use crate::probe;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Returns the total apparent size of the regular files under `path`.
///
/// Symlinks are skipped entirely. Files rejected by the context's nested
/// filter contribute zero. The cancellation check is polled before every
/// entry; once it reports true, the partial sum accumulated so far is
/// returned without opening any further directory.
///
/// # Arguments
/// * `path` - Root of the subtree to sum
/// * `ctx` - Filters, progress sink, cancellation check and skip counter
pub fn aggregate(path: &Path, ctx: &ScanContext) -> u64 {
    let mut total: u64 = 0;

    let walker = WalkDir::new(path)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !ctx.is_excluded(e.path()));

    for entry in walker {
        if ctx.is_cancelled() {
            tracing::debug!("aggregation of {} cancelled", path.display());
            return total;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let err_path = err.path().unwrap_or(path).to_path_buf();
                ctx.record_skip(&ProbeError::from_io(err_path, io::Error::from(err)));
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            continue;
        }

        if file_type.is_file() {
            match probe::apparent_size(entry.path()) {
                Ok(size) if ctx.allows_nested(entry.path(), size) => {
                    total = total.saturating_add(size);
                }
                Ok(_) => {}
                Err(err) => ctx.record_skip(&err),
            }
        }

        ctx.visit(entry.path());
    }

    total
}
