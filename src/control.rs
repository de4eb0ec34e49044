//! Progress reporting and cooperative cancellation for scans.
//!
//! Two narrow capabilities are threaded through every aggregation call:
//! - [`ProgressSink`]: notified once per visited entry, best-effort
//! - [`CancelCheck`]: polled at the start of each directory listing and
//!   before each entry
//!
//! Both have no-op implementations ([`NoProgress`], [`NeverCancel`]) and are
//! bundled with the active filters into a [`ScanContext`] shared by the
//! scan-owning thread and its workers.

use crate::error::ProbeError;
use crate::filter::{Exclusions, FileFilter, FilterOptions};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Receives "currently visiting" notifications.
pub trait ProgressSink: Send + Sync {
    fn on_visit(&self, path: &Path);
}

impl<F> ProgressSink for F
where
    F: Fn(&Path) + Send + Sync,
{
    fn on_visit(&self, path: &Path) {
        self(path)
    }
}

/// Sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_visit(&self, _path: &Path) {}
}

/// Polled by long-running work to decide whether to stop early.
pub trait CancelCheck: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// Check that never requests cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelCheck for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Shared cancellation flag. Single writer (the consumer), many readers.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl CancelCheck for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

/// Forwards at most one notification per `min_interval` to the inner sink.
///
/// Dropped notifications are simply lost; progress is advisory.
pub struct ThrottledProgress<S> {
    inner: S,
    started: Instant,
    min_interval_ms: u64,
    last_emit_ms: AtomicU64,
}

impl<S: ProgressSink> ThrottledProgress<S> {
    pub fn new(inner: S, min_interval: Duration) -> Self {
        Self {
            inner,
            started: Instant::now(),
            min_interval_ms: min_interval.as_millis() as u64,
            last_emit_ms: AtomicU64::new(0),
        }
    }
}

impl<S: ProgressSink> ProgressSink for ThrottledProgress<S> {
    fn on_visit(&self, path: &Path) {
        // Offset by one so the very first visit is always forwarded.
        let now_ms = self.started.elapsed().as_millis() as u64 + 1;
        let last = self.last_emit_ms.load(Ordering::Relaxed);
        if last != 0 && now_ms.saturating_sub(last) < self.min_interval_ms {
            return;
        }
        if self
            .last_emit_ms
            .compare_exchange(last, now_ms, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        self.inner.on_visit(path);
    }
}

/// Everything one scan needs besides the path: filters, sinks and counters.
pub struct ScanContext {
    top_filter: Option<FileFilter>,
    deep_filter: Option<FileFilter>,
    exclusions: Option<Exclusions>,
    progress: Arc<dyn ProgressSink>,
    cancel: Arc<dyn CancelCheck>,
    cancel_seen: AtomicBool,
    skipped: AtomicU64,
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanContext {
    pub fn new() -> Self {
        Self {
            top_filter: None,
            deep_filter: None,
            exclusions: None,
            progress: Arc::new(NoProgress),
            cancel: Arc::new(NeverCancel),
            cancel_seen: AtomicBool::new(false),
            skipped: AtomicU64::new(0),
        }
    }

    /// Builds a context whose filters follow `options`.
    pub fn from_options(options: &FilterOptions) -> Self {
        Self {
            top_filter: options.file_filter(),
            deep_filter: options.aggregation_filter(),
            exclusions: options.exclusions.clone(),
            ..Self::new()
        }
    }

    /// Uses the same predicate for immediate files and inside aggregation.
    pub fn with_filter(mut self, filter: Option<FileFilter>) -> Self {
        self.top_filter = filter.clone();
        self.deep_filter = filter;
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: impl CancelCheck + 'static) -> Self {
        self.cancel = Arc::new(cancel);
        self
    }

    /// Polls the cancel check. A true answer means the caller stops early,
    /// so it is remembered for [`ScanContext::stopped_early`].
    pub fn is_cancelled(&self) -> bool {
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            self.cancel_seen.store(true, Ordering::Relaxed);
        }
        cancelled
    }

    /// True if any poll of [`ScanContext::is_cancelled`] returned true, i.e.
    /// the results are partial. A cancel requested after the work finished
    /// leaves this false.
    pub fn stopped_early(&self) -> bool {
        self.cancel_seen.load(Ordering::Relaxed)
    }

    /// Whether a file directly inside the scanned folder counts.
    pub fn allows_top_level(&self, path: &Path, size: u64) -> bool {
        self.top_filter
            .as_ref()
            .map(|f| f.allows(path, size))
            .unwrap_or(true)
    }

    /// Whether a file found during recursive aggregation counts.
    pub fn allows_nested(&self, path: &Path, size: u64) -> bool {
        self.deep_filter
            .as_ref()
            .map(|f| f.allows(path, size))
            .unwrap_or(true)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclusions
            .as_ref()
            .map(|ex| ex.is_excluded(path))
            .unwrap_or(false)
    }

    /// Notifies the progress sink. A panicking sink never aborts the scan.
    pub fn visit(&self, path: &Path) {
        let progress = &self.progress;
        let _ = panic::catch_unwind(AssertUnwindSafe(|| progress.on_visit(path)));
    }

    /// Records a path that contributed zero because it could not be read.
    pub fn record_skip(&self, err: &ProbeError) {
        tracing::debug!("skipping: {}", err);
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_closure_is_a_progress_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let ctx = ScanContext::new().with_progress(move |p: &Path| {
            sink_seen.lock().unwrap().push(p.to_path_buf());
        });
        ctx.visit(Path::new("/a"));
        ctx.visit(Path::new("/b"));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_panicking_sink_is_swallowed() {
        let ctx = ScanContext::new().with_progress(|_: &Path| panic!("sink failure"));
        ctx.visit(Path::new("/a"));
        ctx.visit(Path::new("/b"));
    }

    #[test]
    fn test_throttled_progress_drops_bursts() {
        let count = Arc::new(AtomicU64::new(0));
        let inner_count = count.clone();
        let throttled = ThrottledProgress::new(
            move |_: &Path| {
                inner_count.fetch_add(1, Ordering::Relaxed);
            },
            Duration::from_secs(60),
        );
        for _ in 0..100 {
            throttled.on_visit(Path::new("/x"));
        }
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_late_cancel_is_not_a_partial_result() {
        let token = CancellationToken::new();
        let ctx = ScanContext::new().with_cancel(token.clone());
        assert!(!ctx.is_cancelled());

        token.cancel();
        assert!(!ctx.stopped_early());
        assert!(ctx.is_cancelled());
        assert!(ctx.stopped_early());
    }

    #[test]
    fn test_default_context_allows_everything() {
        let ctx = ScanContext::new();
        assert!(!ctx.is_cancelled());
        assert!(ctx.allows_top_level(Path::new("/a"), 0));
        assert!(ctx.allows_nested(Path::new("/a"), 0));
        assert!(!ctx.is_excluded(Path::new("/a")));
    }
}
