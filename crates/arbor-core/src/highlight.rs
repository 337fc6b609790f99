#![forbid(unsafe_code)]

//! Subtree highlighting.

use crate::node::TreeNode;
use std::collections::HashSet;

/// Set of highlighted node ids.
///
/// Membership is the only state. A toggle always leaves the whole subtree in
/// one uniform state, even if it started out mixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet {
    ids: HashSet<String>,
}

impl HighlightSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `node` and its whole subtree.
    ///
    /// If `node` itself is highlighted, the subtree is removed from the set;
    /// otherwise it is added. Returns the new state of the subtree.
    pub fn toggle_highlight(&mut self, node: &TreeNode) -> bool {
        let highlight = !self.ids.contains(&node.id);
        self.apply(node, highlight);
        highlight
    }

    fn apply(&mut self, node: &TreeNode, highlight: bool) {
        if highlight {
            self.ids.insert(node.id.clone());
        } else {
            self.ids.remove(&node.id);
        }
        for child in &node.children {
            self.apply(child, highlight);
        }
    }

    #[must_use]
    pub fn is_highlighted(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<String> for HighlightSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
