#![forbid(unsafe_code)]

//! Drag-session identity.
//!
//! Every tree instance gets a [`TreeInstanceId`]. Drag sources carry the id
//! of the instance they came from, and a tree only accepts drops whose
//! source belongs to it, so two trees on screen never steal each other's
//! items.

use crate::instruction::Instruction;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier of one tree instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeInstanceId(u64);

impl TreeInstanceId {
    /// Allocate a process-unique id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether drops from `source` should be handled by this instance.
    #[must_use]
    pub fn accepts(self, source: &DragSource) -> bool {
        source.instance == self
    }
}

impl fmt::Display for TreeInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree#{}", self.0)
    }
}

/// What kind of thing is being dragged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DragKind {
    /// A tree node; the only kind the dispatcher acts on.
    TreeNode,
    /// Anything else (files, text, other widgets), tagged by the caller.
    Other(String),
}

/// The element being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSource {
    pub instance: TreeInstanceId,
    pub item_id: String,
    pub kind: DragKind,
}

impl DragSource {
    /// A tree-node source belonging to `instance`.
    #[must_use]
    pub fn tree_node(instance: TreeInstanceId, item_id: impl Into<String>) -> Self {
        Self {
            instance,
            item_id: item_id.into(),
            kind: DragKind::TreeNode,
        }
    }
}

/// Hit-test data attached to one drop target under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTargetData {
    pub target_id: String,
    /// `None` when the hit-test layer blocked the drop at this position.
    pub instruction: Option<Instruction>,
}

impl DropTargetData {
    #[must_use]
    pub fn new(target_id: impl Into<String>, instruction: Option<Instruction>) -> Self {
        Self {
            target_id: target_id.into(),
            instruction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = TreeInstanceId::next();
        let b = TreeInstanceId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn accepts_only_own_sources() {
        let mine = TreeInstanceId::next();
        let other = TreeInstanceId::next();
        assert!(mine.accepts(&DragSource::tree_node(mine, "a")));
        assert!(!mine.accepts(&DragSource::tree_node(other, "a")));
    }

    #[test]
    fn display() {
        let id = TreeInstanceId::next();
        assert_eq!(id.to_string(), format!("tree#{}", id.get()));
    }
}
