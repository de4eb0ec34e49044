//! Library crate for sizetree
//!
//! A drill-down disk usage explorer. A scan lists the immediate children of
//! one folder, each directory carrying the total size of everything beneath
//! it. Subfolders are scanned lazily when opened, results are cached per
//! node, and navigating back never rescans.
//!
//! # Features
//!
//! - **Child Listing**: Per-folder scans with bounded parallel aggregation
//! - **Sessions**: Background scans with progress, cancellation and a single
//!   terminal event
//! - **Hierarchy Cache**: Lazy expand/collapse over cached child lists
//! - **Filters**: Size thresholds, custom predicates and glob exclusions
//! - **Output**: Terminal listings, CSV export and a status spinner
//!
//! # Modules
//!
//! - [`probe`]: Single-path classification and apparent size
//! - [`aggregate`]: Recursive folder totals
//! - [`scan`]: One-level child listing with parallel subfolder totals
//! - [`session`]: Background scan sessions and the launcher seam
//! - [`hierarchy`]: Node cache and drill stack
//! - [`explorer`]: Expand/collapse navigation over sessions and cache
//! - [`filter`], [`control`]: Scan predicates, progress and cancellation
//! - [`cli`], [`repl`], [`output`], [`utils`]: Command-line front end

pub mod aggregate;
pub mod cli;
pub mod control;
pub mod data;
pub mod error;
pub mod explorer;
pub mod filter;
pub mod hierarchy;
pub mod output;
pub mod probe;
pub mod repl;
pub mod scan;
pub mod session;
pub mod thread_pool;
pub mod utils;

pub use cli::Args;
pub use control::{CancellationToken, ScanContext};
pub use data::{ItemKind, ItemSize, ScanReport};
pub use error::{NavError, ProbeError, SessionError};
pub use explorer::{ExpandOutcome, Explorer, ScanObserver};
pub use filter::{FileFilter, FilterOptions};
pub use hierarchy::{DrillStack, Frame, HierarchyCache, NodeKey, NodeState};
pub use session::{ScanConfig, ScanEvent, ScanLauncher, ScanRequest, ScanSession, ThreadLauncher};
