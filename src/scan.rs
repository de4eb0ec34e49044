//! Parallel scanning of one folder's immediate children.
//!
//! This module handles:
//! - A single serial listing of the folder (files sized directly, symlinks
//!   skipped, subdirectories queued)
//! - Fan-out of each subdirectory to a bounded `rayon` pool running
//!   [`aggregate`](crate::aggregate::aggregate)
//! - Collection of worker results in completion order, with cooperative
//!   cancellation and panic isolation
//!
//! The returned order is unspecified; callers sort as a presentation step.

use crate::aggregate::aggregate;
use crate::control::ScanContext;
use crate::data::{ItemKind, ItemSize};
use crate::error::{ProbeError, SessionError};
use crate::probe;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

/// How long the collector blocks on the result channel before re-checking
/// cancellation.
const COLLECT_POLL: Duration = Duration::from_millis(25);

/// Scans the immediate children of `folder`.
///
/// Files become `ItemKind::File` items when they pass the context's
/// top-level filter. Every non-excluded subdirectory becomes exactly one
/// `ItemKind::Directory` item carrying its recursive total; a worker that
/// panics yields size 0 instead of dropping the entry. When cancellation is
/// observed the function stops waiting and returns whatever has completed.
///
/// # Arguments
/// * `folder` - The folder whose children are listed
/// * `ctx` - Shared filters, progress sink and cancellation check
/// * `pool` - Bounded pool that runs one aggregation per subdirectory
///
/// # Errors
/// Returns a [`SessionError`] if `folder` is missing, not a directory, or
/// cannot be listed. Errors below the folder are recovered as zero.
pub fn scan_children(
    folder: &Path,
    ctx: &Arc<ScanContext>,
    pool: &rayon::ThreadPool,
) -> Result<Vec<ItemSize>, SessionError> {
    let (mut items, subdirs) = list_folder(folder, ctx)?;
    let pending = subdirs.len();

    let (tx, rx) = mpsc::channel::<(PathBuf, Option<u64>)>();
    let mut submitted = 0usize;
    for dir in subdirs {
        if ctx.is_cancelled() {
            break;
        }
        let tx = tx.clone();
        let ctx = Arc::clone(ctx);
        pool.spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| aggregate(&dir, &ctx)));
            let _ = tx.send((dir, result.ok()));
        });
        submitted += 1;
    }
    drop(tx);

    let mut received = 0usize;
    while received < submitted {
        if ctx.is_cancelled() {
            tracing::debug!(
                "scan of {} cancelled with {} of {} folders collected",
                folder.display(),
                received,
                pending
            );
            break;
        }
        match rx.recv_timeout(COLLECT_POLL) {
            Ok((dir, size)) => {
                items.push(directory_item(dir, size));
                received += 1;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Keep anything that finished while cancellation was being observed.
    while let Ok((dir, size)) = rx.try_recv() {
        items.push(directory_item(dir, size));
    }

    Ok(items)
}

/// Lists `folder` once: sizes its files and returns its subdirectories.
fn list_folder(
    folder: &Path,
    ctx: &ScanContext,
) -> Result<(Vec<ItemSize>, Vec<PathBuf>), SessionError> {
    let metadata = fs::metadata(folder).map_err(|source| SessionError::RootUnavailable {
        path: folder.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(SessionError::NotADirectory(folder.to_path_buf()));
    }

    let read_dir = fs::read_dir(folder).map_err(|source| SessionError::RootUnavailable {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                ctx.record_skip(&ProbeError::from_io(folder, err));
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                ctx.record_skip(&ProbeError::from_io(&path, err));
                continue;
            }
        };

        if file_type.is_symlink() || ctx.is_excluded(&path) {
            continue;
        }

        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_file() {
            match probe::apparent_size(&path) {
                Ok(size) if ctx.allows_top_level(&path, size) => {
                    ctx.visit(&path);
                    files.push(ItemSize::new(path, size, ItemKind::File));
                }
                Ok(_) => ctx.visit(&path),
                Err(err) => ctx.record_skip(&err),
            }
        }
    }

    Ok((files, subdirs))
}

fn directory_item(dir: PathBuf, size: Option<u64>) -> ItemSize {
    let size = size.unwrap_or_else(|| {
        tracing::warn!("aggregation worker for {} panicked; reporting 0", dir.display());
        0
    });
    ItemSize::new(dir, size, ItemKind::Directory)
}
