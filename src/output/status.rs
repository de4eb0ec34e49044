//! Spinner-backed status line for running scans.

use crate::data::ScanReport;
use crate::explorer::ScanObserver;
use crate::hierarchy::NodeKey;
use crate::utils::shorten_path;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Shows "Scanning: ..." while sessions run and reports their outcome.
pub struct StatusLine {
    pb: ProgressBar,
}

impl StatusLine {
    pub fn new() -> Result<Self> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
                .template("{spinner} {msg} [{elapsed}]")
                .context("Failed to set progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Ok(Self { pb })
    }

    /// A status line that draws nothing, for non-terminal output.
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl ScanObserver for StatusLine {
    fn on_progress(&mut self, path: &Path) {
        self.pb
            .set_message(format!("Scanning: {}", shorten_path(path, 40)));
    }

    fn on_session_done(&mut self, node: &NodeKey, report: &ScanReport) {
        let suffix = if report.cancelled { " (cancelled)" } else { "" };
        self.pb.set_message(format!(
            "Done. Found {} items in {}{}",
            report.items.len(),
            node,
            suffix
        ));
        if report.skipped > 0 {
            self.pb
                .println(format!("{} paths could not be read", report.skipped));
        }
    }

    fn on_session_error(&mut self, node: &NodeKey, reason: &str) {
        self.pb.println(format!("Error scanning {}: {}", node, reason));
    }
}
