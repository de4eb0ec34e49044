//! Drill-down explorer: the narrow interface presentation layers talk to.
//!
//! [`Explorer`] owns the [`HierarchyCache`], the [`DrillStack`] and every
//! in-flight [`ScanSession`]. All state changes happen on the caller's
//! thread, either synchronously in [`Explorer::expand_node`] /
//! [`Explorer::collapse_node`] or when [`Explorer::pump`] handles a
//! session's terminal event. Scan results are reported to a
//! [`ScanObserver`].
//!
//! Navigation keeps a single drill path: expanding a node collapses any open
//! sibling (and its descendants), so the stack depth is bounded by the tree
//! depth.

use crate::data::ScanReport;
use crate::error::NavError;
use crate::filter::FilterOptions;
use crate::hierarchy::{DrillStack, Frame, HierarchyCache, NodeKey, NodeState};
use crate::session::{ScanConfig, ScanEvent, ScanLauncher, ScanRequest, ScanSession, ThreadLauncher};
use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Callbacks for a presentation layer. Every method defaults to a no-op.
pub trait ScanObserver {
    /// "Currently scanning" status. Best-effort; may be throttled.
    fn on_progress(&mut self, _path: &Path) {}
    fn on_session_done(&mut self, _node: &NodeKey, _report: &ScanReport) {}
    fn on_session_error(&mut self, _node: &NodeKey, _reason: &str) {}
    /// The top of the drill stack changed because a scan completed.
    fn on_view_changed(&mut self, _view: &Frame) {}
}

impl ScanObserver for () {}

/// What an expand request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// Served from the cache; the view changed immediately.
    Cached,
    /// A scan session was started; the view changes when it completes.
    Started,
    /// A session for this node is already running; nothing new was started.
    AlreadyLoading,
}

pub struct Explorer<L: ScanLauncher = ThreadLauncher> {
    launcher: L,
    filter: FilterOptions,
    poll_interval: Duration,
    root: Option<NodeKey>,
    root_session: Option<ScanSession>,
    root_report: Option<ScanReport>,
    sessions: HashMap<NodeKey, ScanSession>,
    cache: HierarchyCache,
    stack: Option<DrillStack>,
    pending_focus: Option<NodeKey>,
}

impl Explorer<ThreadLauncher> {
    /// Explorer backed by real filesystem scans.
    pub fn with_config(config: ScanConfig) -> Self {
        let poll_interval = config.poll_interval;
        Self::new(ThreadLauncher::new(config)).with_poll_interval(poll_interval)
    }
}

impl<L: ScanLauncher> Explorer<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            filter: FilterOptions::default(),
            poll_interval: ScanConfig::default().poll_interval,
            root: None,
            root_session: None,
            root_report: None,
            sessions: HashMap::new(),
            cache: HierarchyCache::new(),
            stack: None,
            pending_focus: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Filter of the current root scan, also used for every expansion below it.
    pub fn filter(&self) -> &FilterOptions {
        &self.filter
    }

    /// Starts a root scan of `path` with `filter`, discarding all previous
    /// navigation state. Expansions under this root reuse the same filter.
    ///
    /// # Errors
    /// Returns [`NavError::RootScanInProgress`] while another root scan is
    /// running; cancel it first with [`Explorer::cancel_root`].
    pub fn scan_root(&mut self, path: &Path, filter: FilterOptions) -> Result<(), NavError> {
        if self.root_session.is_some() {
            return Err(NavError::RootScanInProgress);
        }

        let key = NodeKey::canonical(path).unwrap_or_else(|_| NodeKey::new(path));
        self.sessions.clear();
        self.cache.clear();
        self.stack = None;
        self.pending_focus = None;
        self.root_report = None;
        self.filter = filter;

        self.cache.begin_loading(&key);
        let request = ScanRequest::new(key.path())
            .with_filter(self.filter.clone())
            .with_progress(true);
        self.root_session = Some(self.launcher.launch(request));
        self.root = Some(key);
        Ok(())
    }

    /// Requests cancellation of the root scan. It still completes with the
    /// partial items gathered so far.
    pub fn cancel_root(&mut self) {
        if let Some(session) = &self.root_session {
            session.cancel();
        }
    }

    /// Requests cancellation of every running session.
    pub fn cancel_all(&mut self) {
        self.cancel_root();
        for session in self.sessions.values() {
            session.cancel();
        }
    }

    /// Opens `key`, making its children the active view.
    ///
    /// `key` must be the focused node, an ancestor on the drill path, or a
    /// directory listed by one of the open frames. Any other open branch at
    /// the same level is collapsed first.
    ///
    /// # Errors
    /// Returns [`NavError::NoRoot`] before a root scan completes and
    /// [`NavError::UnknownNode`] if `key` is not visible.
    pub fn expand_node(&mut self, key: &NodeKey) -> Result<ExpandOutcome, NavError> {
        let stack = self.stack.as_mut().ok_or(NavError::NoRoot)?;

        if let Some(index) = stack.position(key) {
            stack.truncate(index + 1);
            self.abandon_pending(None);
            return Ok(ExpandOutcome::Cached);
        }

        let parent_index = key
            .parent()
            .and_then(|parent| stack.position(&parent))
            .filter(|&index| stack.frames()[index].lists_directory(key))
            .ok_or_else(|| NavError::UnknownNode(key.path().to_path_buf()))?;

        // Sibling exclusivity: close whatever is open below the parent.
        stack.truncate(parent_index + 1);

        match self.cache.state(key) {
            NodeState::Loaded(items) => {
                stack.push(Frame::new(key.clone(), items));
                self.abandon_pending(None);
                Ok(ExpandOutcome::Cached)
            }
            NodeState::Loading => {
                self.abandon_pending(Some(key));
                self.pending_focus = Some(key.clone());
                // A session abandoned earlier is replaced rather than awaited.
                let abandoned = self
                    .sessions
                    .get(key)
                    .is_none_or(|session| session.is_cancelled());
                if abandoned {
                    self.launch_expansion(key);
                    Ok(ExpandOutcome::Started)
                } else {
                    Ok(ExpandOutcome::AlreadyLoading)
                }
            }
            NodeState::NotLoaded => {
                self.abandon_pending(Some(key));
                self.pending_focus = Some(key.clone());
                self.cache.begin_loading(key);
                self.launch_expansion(key);
                Ok(ExpandOutcome::Started)
            }
        }
    }

    fn launch_expansion(&mut self, key: &NodeKey) {
        let request = ScanRequest::new(key.path()).with_filter(self.filter.clone());
        let session = self.launcher.launch(request);
        self.sessions.insert(key.clone(), session);
    }

    /// Closes `key` and everything opened below it. The parent's listing
    /// becomes the active view again; nothing is rescanned or evicted.
    ///
    /// A scan still running for `key` or a descendant keeps running and
    /// fills the cache when it completes, but no longer changes the view.
    ///
    /// Returns whether the view changed. Collapsing the root is a no-op.
    ///
    /// # Errors
    /// Returns [`NavError::NoRoot`] before a root scan completes.
    pub fn collapse_node(&mut self, key: &NodeKey) -> Result<bool, NavError> {
        let position = self.stack.as_ref().ok_or(NavError::NoRoot)?.position(key);
        if position == Some(0) {
            return Ok(false);
        }

        if self
            .pending_focus
            .as_ref()
            .is_some_and(|pending| pending.path().starts_with(key.path()))
        {
            self.pending_focus = None;
        }

        match (position, self.stack.as_mut()) {
            (Some(index), Some(stack)) => {
                stack.truncate(index);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Pops the focused level, if it is not the root.
    pub fn collapse_top(&mut self) -> Result<bool, NavError> {
        let top = self.stack.as_ref().ok_or(NavError::NoRoot)?.top().node.clone();
        self.collapse_node(&top)
    }

    /// Handles every event that is ready, without blocking.
    ///
    /// Returns the number of events handled.
    pub fn pump(&mut self, observer: &mut dyn ScanObserver) -> usize {
        let mut handled = 0;

        if let Some(session) = self.root_session.as_mut() {
            let events = session.drain();
            let finished = session.is_finished();
            for event in events {
                handled += 1;
                self.handle_root_event(event, observer);
            }
            if finished {
                self.root_session = None;
            }
        }

        let mut events = Vec::new();
        for (key, session) in self.sessions.iter_mut() {
            for event in session.drain() {
                events.push((key.clone(), event));
            }
        }
        self.sessions.retain(|_, session| !session.is_finished());

        for (key, event) in events {
            handled += 1;
            self.handle_expansion_event(&key, event, observer);
        }

        handled
    }

    /// Polls on the configured interval until no session is running or
    /// `timeout` elapses. Returns true if the explorer became idle.
    pub fn run_until_idle(&mut self, observer: &mut dyn ScanObserver, timeout: Duration) -> bool {
        let started = Instant::now();
        loop {
            self.pump(observer);
            if !self.is_busy() {
                return true;
            }
            if started.elapsed() >= timeout {
                return false;
            }
            thread::sleep(self.poll_interval);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.root_session.is_some() || !self.sessions.is_empty()
    }

    pub fn root(&self) -> Option<&NodeKey> {
        self.root.as_ref()
    }

    pub fn root_report(&self) -> Option<&ScanReport> {
        self.root_report.as_ref()
    }

    pub fn active_view(&self) -> Option<&Frame> {
        self.stack.as_ref().map(|stack| stack.top())
    }

    pub fn stack(&self) -> Option<&DrillStack> {
        self.stack.as_ref()
    }

    pub fn cache(&self) -> &HierarchyCache {
        &self.cache
    }

    /// The node whose expansion is awaited, if any.
    pub fn pending_focus(&self) -> Option<&NodeKey> {
        self.pending_focus.as_ref()
    }

    /// Looks up a directory of the active view by its label.
    pub fn child_key(&self, label: &str) -> Option<NodeKey> {
        self.active_view()?
            .items
            .iter()
            .find(|item| item.is_dir() && item.label == label)
            .map(NodeKey::from)
    }

    fn handle_root_event(&mut self, event: ScanEvent, observer: &mut dyn ScanObserver) {
        let Some(root) = self.root.clone() else {
            return;
        };
        match event {
            ScanEvent::Progress(path) => observer.on_progress(&path),
            ScanEvent::Done(report) => {
                let items = self.cache.finish_loading(&root, report.items.clone());
                let stack = DrillStack::new(Frame::new(root.clone(), items));
                observer.on_session_done(&root, &report);
                observer.on_view_changed(stack.top());
                self.stack = Some(stack);
                self.root_report = Some(report);
            }
            ScanEvent::Error(reason) => {
                tracing::error!("root scan of {} failed: {}", root, reason);
                self.cache.abort_loading(&root);
                observer.on_session_error(&root, &reason);
            }
        }
    }

    fn handle_expansion_event(
        &mut self,
        key: &NodeKey,
        event: ScanEvent,
        observer: &mut dyn ScanObserver,
    ) {
        match event {
            ScanEvent::Progress(path) => observer.on_progress(&path),
            ScanEvent::Done(report) if report.cancelled => {
                // Partial listings are not cached; a later expand rescans.
                self.cache.abort_loading(key);
                if self.pending_focus.as_ref() == Some(key) {
                    self.pending_focus = None;
                }
                observer.on_session_done(key, &report);
            }
            ScanEvent::Done(report) => {
                let items = self.cache.finish_loading(key, report.items.clone());
                observer.on_session_done(key, &report);
                if self.pending_focus.as_ref() == Some(key) {
                    self.pending_focus = None;
                    if let Some(stack) = self.stack.as_mut() {
                        let parent_index = key.parent().and_then(|p| stack.position(&p));
                        if let Some(index) = parent_index {
                            stack.truncate(index + 1);
                            stack.push(Frame::new(key.clone(), items));
                            observer.on_view_changed(stack.top());
                        }
                    }
                }
            }
            ScanEvent::Error(reason) => {
                tracing::warn!("expansion of {} failed: {}", key, reason);
                self.cache.abort_loading(key);
                if self.pending_focus.as_ref() == Some(key) {
                    self.pending_focus = None;
                }
                observer.on_session_error(key, &reason);
            }
        }
    }

    /// Drops the awaited focus unless it is `keep`, cancelling its session.
    fn abandon_pending(&mut self, keep: Option<&NodeKey>) {
        let Some(pending) = self.pending_focus.take() else {
            return;
        };
        if keep == Some(&pending) {
            self.pending_focus = Some(pending);
            return;
        }
        if let Some(session) = self.sessions.get(&pending) {
            session.cancel();
        }
    }
}
