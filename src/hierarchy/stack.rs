//! Drill-down stack of displayed item lists.

use super::cache::NodeKey;
use crate::data::ItemSize;
use std::sync::Arc;

/// One displayed level: the node that was opened and its children.
#[derive(Debug, Clone)]
pub struct Frame {
    pub node: NodeKey,
    pub items: Arc<[ItemSize]>,
}

impl Frame {
    pub fn new(node: NodeKey, items: Arc<[ItemSize]>) -> Self {
        Self { node, items }
    }

    /// True if `key` is a directory listed in this frame.
    pub fn lists_directory(&self, key: &NodeKey) -> bool {
        self.items
            .iter()
            .any(|item| item.is_dir() && item.path == key.path())
    }
}

/// Stack of frames. Frame 0 is always the root scan and is never popped,
/// so the stack is never empty; the top is the focused node's listing.
#[derive(Debug, Clone)]
pub struct DrillStack {
    frames: Vec<Frame>,
}

impl DrillStack {
    pub fn new(root: Frame) -> Self {
        Self { frames: vec![root] }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pops the top frame unless it is the root.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Keeps the first `len` frames (never fewer than the root).
    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len.max(1));
    }

    pub fn top(&self) -> &Frame {
        // Non-empty by construction.
        &self.frames[self.frames.len() - 1]
    }

    pub fn root(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn position(&self, key: &NodeKey) -> Option<usize> {
        self.frames.iter().position(|frame| &frame.node == key)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ItemKind;
    use std::path::PathBuf;

    fn frame(path: &str, children: &[(&str, u64)]) -> Frame {
        let items: Vec<ItemSize> = children
            .iter()
            .map(|(name, size)| {
                ItemSize::new(PathBuf::from(path).join(name), *size, ItemKind::Directory)
            })
            .collect();
        Frame::new(NodeKey::new(path), items.into())
    }

    #[test]
    fn test_root_is_never_popped() {
        let mut stack = DrillStack::new(frame("/r", &[("C", 5)]));
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 1);
        stack.truncate(0);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_push_pop_restores_previous_view() {
        let root = frame("/r", &[("C", 5)]);
        let mut stack = DrillStack::new(root.clone());
        stack.push(frame("/r/C", &[("D", 1)]));
        stack.push(frame("/r/C/D", &[]));
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.position(&NodeKey::new("/r/C")), Some(1));

        stack.pop();
        stack.pop();
        assert!(Arc::ptr_eq(&stack.top().items, &root.items));
    }

    #[test]
    fn test_lists_directory() {
        let root = frame("/r", &[("C", 5)]);
        assert!(root.lists_directory(&NodeKey::new("/r/C")));
        assert!(!root.lists_directory(&NodeKey::new("/r/X")));
    }
}
