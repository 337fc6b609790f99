#![forbid(unsafe_code)]

//! Row mode of a node within its sibling list, used to pick connector glyphs.

use crate::node::TreeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemMode {
    /// Node has children.
    Expanded,
    /// Leaf at the end of its sibling list.
    LastInGroup,
    /// Any other leaf.
    Standard,
}

impl ItemMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Expanded => "expanded",
            Self::LastInGroup => "last-in-group",
            Self::Standard => "standard",
        }
    }
}

/// Mode of `node`, which sits at `index` in `siblings`.
#[must_use]
pub fn item_mode(node: &TreeNode, index: usize, siblings: &[TreeNode]) -> ItemMode {
    if !node.children.is_empty() {
        ItemMode::Expanded
    } else if index + 1 == siblings.len() {
        ItemMode::LastInGroup
    } else {
        ItemMode::Standard
    }
}
