//! Scan sessions: one logical scan request and its hand-off to a single
//! consumer.
//!
//! A [`ScanSession`] owns a cancellation token, a result channel and the
//! thread that runs [`scan_children`]. The consumer polls the session
//! (non-blocking or with a timeout) and receives, in order, zero or more
//! [`ScanEvent::Progress`] events followed by exactly one terminal event:
//! [`ScanEvent::Done`] or [`ScanEvent::Error`]. Cancellation is not an
//! error; a cancelled session still ends with `Done` carrying partial items.

use crate::control::{CancellationToken, ScanContext, ThrottledProgress};
use crate::data::{ItemKind, ItemSize, ScanReport};
use crate::error::SessionError;
use crate::filter::FilterOptions;
use crate::scan::scan_children;
use crate::thread_pool::{DEFAULT_WORKERS, build_worker_pool};
use anyhow::{Result, anyhow};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// Library-level tunables for scanning.
///
/// # Fields
/// * `workers` - Bound on concurrent subdirectory aggregations
/// * `poll_interval` - How often a consumer loop should poll for events
/// * `progress_interval` - Minimum spacing between progress events
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub workers: usize,
    pub poll_interval: Duration,
    pub progress_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            poll_interval: Duration::from_millis(100),
            progress_interval: Duration::from_millis(50),
        }
    }
}

/// One scan invocation.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub root: PathBuf,
    pub filter: FilterOptions,
    pub report_progress: bool,
}

impl ScanRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: FilterOptions::default(),
            report_progress: false,
        }
    }

    pub fn with_filter(mut self, filter: FilterOptions) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_progress(mut self, report_progress: bool) -> Self {
        self.report_progress = report_progress;
        self
    }
}

/// Messages delivered to the session's consumer.
#[derive(Debug)]
pub enum ScanEvent {
    Progress(PathBuf),
    Done(ScanReport),
    Error(String),
}

impl ScanEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanEvent::Progress(_))
    }
}

/// The producer side handed to a session's job.
#[derive(Clone)]
pub struct SessionHandle {
    token: CancellationToken,
    tx: Sender<ScanEvent>,
}

impl SessionHandle {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Emits a progress event. Silently dropped if the consumer is gone.
    pub fn progress(&self, path: &Path) {
        let _ = self.tx.send(ScanEvent::Progress(path.to_path_buf()));
    }
}

/// A running (or finished) scan.
pub struct ScanSession {
    root: PathBuf,
    token: CancellationToken,
    rx: Receiver<ScanEvent>,
    finished: bool,
}

impl ScanSession {
    /// Starts scanning `request.root` on a dedicated thread.
    pub fn start(request: ScanRequest, config: &ScanConfig) -> Self {
        let root = request.root.clone();
        let config = config.clone();
        Self::spawn(root, move |handle| run_scan(request, &config, &handle))
    }

    /// Runs an arbitrary job as a session.
    ///
    /// The job's result becomes the terminal event; a panicking job ends the
    /// session with `Error`.
    pub fn spawn<F>(root: PathBuf, job: F) -> Self
    where
        F: FnOnce(SessionHandle) -> Result<ScanReport, SessionError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let token = CancellationToken::new();
        let handle = SessionHandle {
            token: token.clone(),
            tx: tx.clone(),
        };

        let spawned = thread::Builder::new()
            .name("sizetree-scan".into())
            .spawn(move || {
                let terminal_tx = handle.tx.clone();
                let event = match panic::catch_unwind(AssertUnwindSafe(|| job(handle))) {
                    Ok(Ok(report)) => ScanEvent::Done(report),
                    Ok(Err(err)) => ScanEvent::Error(err.to_string()),
                    Err(_) => ScanEvent::Error("scan thread panicked".to_string()),
                };
                let _ = terminal_tx.send(event);
            });

        if let Err(err) = spawned {
            let _ = tx.send(ScanEvent::Error(format!("failed to start scan thread: {}", err)));
        }

        Self {
            root,
            token,
            rx,
            finished: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Requests cooperative cancellation. The session still ends with `Done`.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the terminal event has been handed to the consumer.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the next event if one is ready, without blocking.
    pub fn try_next(&mut self) -> Option<ScanEvent> {
        if self.finished {
            return None;
        }
        match self.rx.try_recv() {
            Ok(event) => Some(self.observe(event)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.lost()),
        }
    }

    /// Waits up to `timeout` for the next event.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<ScanEvent> {
        if self.finished {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(self.observe(event)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.lost()),
        }
    }

    /// Returns every event that is ready now, in order.
    pub fn drain(&mut self) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_next() {
            events.push(event);
        }
        events
    }

    /// Blocks until the session ends, discarding progress events.
    ///
    /// # Errors
    /// Returns the session's error reason if it ended with `Error`, or if the
    /// terminal event was already consumed.
    pub fn wait(&mut self) -> Result<ScanReport> {
        if self.finished {
            return Err(anyhow!("scan session already finished"));
        }
        loop {
            let event = match self.rx.recv() {
                Ok(event) => self.observe(event),
                Err(_) => self.lost(),
            };
            match event {
                ScanEvent::Progress(_) => continue,
                ScanEvent::Done(report) => return Ok(report),
                ScanEvent::Error(reason) => return Err(anyhow!(reason)),
            }
        }
    }

    fn observe(&mut self, event: ScanEvent) -> ScanEvent {
        if event.is_terminal() {
            self.finished = true;
        }
        event
    }

    fn lost(&mut self) -> ScanEvent {
        self.finished = true;
        ScanEvent::Error("scan thread exited without a result".to_string())
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        if !self.finished {
            self.token.cancel();
        }
    }
}

/// Starts sessions. The explorer talks to this seam, so tests can count or
/// script scans.
pub trait ScanLauncher {
    fn launch(&self, request: ScanRequest) -> ScanSession;
}

/// Launches real filesystem scans on background threads.
#[derive(Debug, Clone, Default)]
pub struct ThreadLauncher {
    pub config: ScanConfig,
}

impl ThreadLauncher {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }
}

impl ScanLauncher for ThreadLauncher {
    fn launch(&self, request: ScanRequest) -> ScanSession {
        ScanSession::start(request, &self.config)
    }
}

/// Body of a filesystem scan session.
fn run_scan(
    request: ScanRequest,
    config: &ScanConfig,
    handle: &SessionHandle,
) -> Result<ScanReport, SessionError> {
    let started = Instant::now();
    tracing::info!("scan started: {}", request.root.display());

    let mut ctx = ScanContext::from_options(&request.filter).with_cancel(handle.token().clone());
    if request.report_progress {
        let sink = handle.clone();
        ctx = ctx.with_progress(ThrottledProgress::new(
            move |path: &Path| sink.progress(path),
            config.progress_interval,
        ));
    }
    let ctx = Arc::new(ctx);

    let pool =
        build_worker_pool(config.workers).map_err(|e| SessionError::Worker(format!("{:#}", e)))?;
    let items = scan_children(&request.root, &ctx, &pool)?;
    let items = finalize_items(items, &request.filter);

    let report = ScanReport {
        items,
        skipped: ctx.skipped(),
        cancelled: ctx.stopped_early(),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        "scan finished: {} ({} items, {} skipped, cancelled={}, {:?})",
        request.root.display(),
        report.items.len(),
        report.skipped,
        report.cancelled,
        report.elapsed
    );
    Ok(report)
}

/// Applies the post-scan presentation rules: drops files under the size
/// threshold, drops empty directories when asked to, and sorts by size
/// descending (ties by label).
pub fn finalize_items(mut items: Vec<ItemSize>, filter: &FilterOptions) -> Vec<ItemSize> {
    items.retain(|item| match item.kind {
        ItemKind::File => item.size >= filter.min_size_bytes,
        ItemKind::Directory => !(filter.hide_empty_dirs && item.size == 0),
    });
    items.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.label.cmp(&b.label)));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, size: u64, kind: ItemKind) -> ItemSize {
        ItemSize::new(PathBuf::from("/r").join(name), size, kind)
    }

    #[test]
    fn test_finalize_items_sorts_and_filters() {
        let items = vec![
            item("a.txt", 10, ItemKind::File),
            item("C", 5, ItemKind::Directory),
            item("b.bin", 20, ItemKind::File),
            item("E", 0, ItemKind::Directory),
        ];

        let kept = finalize_items(items.clone(), &FilterOptions::min_size(15, false));
        let labels: Vec<_> = kept.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["b.bin", "C", "E"]);

        let mut hide = FilterOptions::default();
        hide.hide_empty_dirs = true;
        let kept = finalize_items(items, &hide);
        let labels: Vec<_> = kept.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["b.bin", "a.txt", "C"]);
    }

    #[test]
    fn test_spawned_session_yields_progress_then_done() {
        let mut session = ScanSession::spawn(PathBuf::from("/r"), |handle| {
            handle.progress(Path::new("/r/one"));
            handle.progress(Path::new("/r/two"));
            Ok(ScanReport::default())
        });

        let mut events = Vec::new();
        while !session.is_finished() {
            if let Some(event) = session.next_timeout(Duration::from_secs(5)) {
                events.push(event);
            }
        }
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], ScanEvent::Progress(p) if p.ends_with("one")));
        assert!(matches!(&events[1], ScanEvent::Progress(p) if p.ends_with("two")));
        assert!(matches!(events[2], ScanEvent::Done(_)));
        assert!(session.try_next().is_none());
    }

    #[test]
    fn test_session_error_is_terminal() {
        let mut session = ScanSession::spawn(PathBuf::from("/missing"), |_| {
            Err(SessionError::NotADirectory(PathBuf::from("/missing")))
        });
        let err = session.wait().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
        assert!(session.is_finished());
    }

    #[test]
    fn test_panicking_job_reports_error() {
        let mut session = ScanSession::spawn(PathBuf::from("/r"), |_| panic!("boom"));
        assert!(session.wait().is_err());
    }

    #[test]
    fn test_cancel_is_visible_to_job() {
        let mut session = ScanSession::spawn(PathBuf::from("/r"), |handle| {
            while !handle.is_cancelled() {
                thread::sleep(Duration::from_millis(5));
            }
            Ok(ScanReport {
                cancelled: true,
                ..Default::default()
            })
        });
        session.cancel();
        let report = session.wait().unwrap();
        assert!(report.cancelled);
    }
}
