#![forbid(unsafe_code)]

//! Tree and leaf data model.
//!
//! A tree is an ordered `Vec<TreeNode>` of roots. Every node carries a stable
//! string id that survives every structural mutation: a moved node keeps its
//! id and its whole subtree, only its position changes.
//!
//! # Example
//!
//! ```
//! use arbor_core::node::TreeNode;
//!
//! let node = TreeNode::new("src", "src")
//!     .child(TreeNode::leaf("main", "main.rs"))
//!     .child(TreeNode::leaf("lib", "lib.rs"));
//!
//! assert!(!node.is_leaf());
//! assert_eq!(node.descendant_count(), 2);
//! assert_eq!(node.ids(), vec!["src", "main", "lib"]);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node in the tree hierarchy.
///
/// A node with no children is a *leaf* and can display fetched [`LeafNode`]
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeNode {
    /// Unique, non-empty identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Ordered children. Empty for leaves.
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a node with the given id and label and no children.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Alias for [`new`](Self::new) that reads better at leaf call sites.
    #[must_use]
    pub fn leaf(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label)
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, node: TreeNode) -> Self {
        self.children.push(node);
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<TreeNode>) -> Self {
        self.children = nodes;
        self
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below this one (not counting itself).
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Ids of this node and all descendants, pre-order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(1 + self.descendant_count());
        self.collect_ids(&mut out);
        out
    }

    pub(crate) fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

/// Tree payload as delivered by the fetch collaborator.
///
/// Ids and children are optional on the wire; [`crate::ingest::add_ids_to_tree`]
/// turns a `Vec<TreeNodeData>` into a `Vec<TreeNode>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeNodeData {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub id: Option<String>,
    pub label: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub children: Option<Vec<TreeNodeData>>,
}

impl TreeNodeData {
    /// Payload node without an id.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: label.into(),
            children: None,
        }
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a child payload node.
    #[must_use]
    pub fn child(mut self, node: TreeNodeData) -> Self {
        self.children.get_or_insert_with(Vec::new).push(node);
        self
    }
}

/// Descriptive metadata for a leaf, fetched lazily by id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LeafNode {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_at: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_by: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_modified_at: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_modified_by: String,
}

/// Leaf payload as returned by the fetch collaborator; the id may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct LeafPayload {
    pub id: Option<String>,
    pub description: String,
    pub created_at: String,
    pub created_by: String,
    pub last_modified_at: String,
    pub last_modified_by: String,
}

impl LeafNode {
    /// Build a leaf record from a fetched payload.
    ///
    /// The requested `id` always wins over whatever id the payload carries,
    /// so the cache key and the record id agree.
    #[must_use]
    pub fn from_payload(id: impl Into<String>, payload: LeafPayload) -> Self {
        Self {
            id: id.into(),
            description: payload.description,
            created_at: payload.created_at,
            created_by: payload.created_by,
            last_modified_at: payload.last_modified_at,
            last_modified_by: payload.last_modified_by,
        }
    }
}
