//! On-demand hierarchy state for drill-down navigation.
//!
//! - [`cache`]: per-node `NotLoaded -> Loading -> Loaded` expansion cache,
//!   keyed by canonical filesystem path
//! - [`stack`]: the stack of displayed item lists, one frame per open level
//!
//! Both are plain owned structures mutated only by the consumer thread when
//! it handles terminal scan events; producers never touch them.

pub mod cache;
pub mod stack;

pub use cache::{HierarchyCache, NodeKey, NodeState};
pub use stack::{DrillStack, Frame};
