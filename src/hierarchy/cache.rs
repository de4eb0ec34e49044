//! Lazy expansion cache.

use crate::data::ItemSize;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identifies a tree position by its filesystem path.
///
/// Two nodes are the same iff their paths are equal. Keys for scan roots are
/// canonicalized; child keys are derived from the root and stay canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(PathBuf);

impl NodeKey {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Resolves `path` to its canonical form.
    pub fn canonical(path: &Path) -> io::Result<Self> {
        std::fs::canonicalize(path).map(Self)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.0.parent().map(|p| NodeKey(p.to_path_buf()))
    }
}

impl From<&ItemSize> for NodeKey {
    fn from(item: &ItemSize) -> Self {
        NodeKey(item.path.clone())
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Expansion state of one node.
#[derive(Debug, Clone, Default)]
pub enum NodeState {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Arc<[ItemSize]>),
}

/// Maps nodes to their expansion state.
///
/// Loaded entries hold exact integer sizes; collapsing never evicts
/// them, so re-expanding is free.
#[derive(Debug, Default)]
pub struct HierarchyCache {
    nodes: HashMap<NodeKey, NodeState>,
}

impl HierarchyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &NodeKey) -> NodeState {
        self.nodes.get(key).cloned().unwrap_or_default()
    }

    pub fn is_loading(&self, key: &NodeKey) -> bool {
        matches!(self.nodes.get(key), Some(NodeState::Loading))
    }

    pub fn items(&self, key: &NodeKey) -> Option<Arc<[ItemSize]>> {
        match self.nodes.get(key) {
            Some(NodeState::Loaded(items)) => Some(Arc::clone(items)),
            _ => None,
        }
    }

    /// Moves `key` from `NotLoaded` to `Loading`.
    ///
    /// Returns false (and changes nothing) if the node is already loading or
    /// loaded.
    pub fn begin_loading(&mut self, key: &NodeKey) -> bool {
        match self.nodes.get(key) {
            Some(NodeState::Loading) | Some(NodeState::Loaded(_)) => false,
            _ => {
                self.nodes.insert(key.clone(), NodeState::Loading);
                true
            }
        }
    }

    /// Stores the items for `key` and returns the shared list.
    pub fn finish_loading(&mut self, key: &NodeKey, items: Vec<ItemSize>) -> Arc<[ItemSize]> {
        let items: Arc<[ItemSize]> = items.into();
        self.nodes
            .insert(key.clone(), NodeState::Loaded(Arc::clone(&items)));
        items
    }

    /// Returns a loading node to `NotLoaded` so a later expand can retry.
    pub fn abort_loading(&mut self, key: &NodeKey) {
        if self.is_loading(key) {
            self.nodes.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
