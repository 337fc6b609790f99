#![forbid(unsafe_code)]

//! Structural operations over an immutable tree.
//!
//! Every function borrows the input tree and returns a fresh value; nothing
//! here mutates its input or fails. A missing id is always a no-op (or an
//! empty / `None` result), never an error.
//!
//! # Invariants
//!
//! 1. Ids are never created or duplicated. Only [`remove`] drops ids, and
//!    only the ones it was asked to drop.
//! 2. Inserting relative to an id that is not in the tree returns a tree
//!    equal to the input.
//! 3. All operations are a single depth-first pass, O(n) in node count.
//!
//! Nothing here checks for cycles: inserting a node under one of its own
//! descendants is the caller's responsibility. The dispatcher in
//! [`crate::dispatch`] guards against it.

use crate::node::TreeNode;

/// Remove every node whose id equals `id`, at every level.
#[must_use]
pub fn remove(tree: &[TreeNode], id: &str) -> Vec<TreeNode> {
    tree.iter()
        .filter(|node| node.id != id)
        .map(|node| TreeNode {
            id: node.id.clone(),
            label: node.label.clone(),
            children: remove(&node.children, id),
        })
        .collect()
}

/// Splice `item` immediately before the node with `target_id`.
#[must_use]
pub fn insert_before(tree: &[TreeNode], target_id: &str, item: &TreeNode) -> Vec<TreeNode> {
    splice(tree, target_id, item, Placement::Before)
}

/// Splice `item` immediately after the node with `target_id`.
#[must_use]
pub fn insert_after(tree: &[TreeNode], target_id: &str, item: &TreeNode) -> Vec<TreeNode> {
    splice(tree, target_id, item, Placement::After)
}

/// Prepend `item` to the children of the node with `target_id`.
#[must_use]
pub fn insert_child(tree: &[TreeNode], target_id: &str, item: &TreeNode) -> Vec<TreeNode> {
    splice(tree, target_id, item, Placement::FirstChild)
}

#[derive(Clone, Copy)]
enum Placement {
    Before,
    After,
    FirstChild,
}

fn splice(tree: &[TreeNode], target_id: &str, item: &TreeNode, at: Placement) -> Vec<TreeNode> {
    let mut out = Vec::with_capacity(tree.len() + 1);
    for node in tree {
        if node.id != target_id {
            out.push(TreeNode {
                id: node.id.clone(),
                label: node.label.clone(),
                children: splice(&node.children, target_id, item, at),
            });
            continue;
        }
        match at {
            Placement::Before => {
                out.push(item.clone());
                out.push(node.clone());
            }
            Placement::After => {
                out.push(node.clone());
                out.push(item.clone());
            }
            Placement::FirstChild => {
                let mut children = Vec::with_capacity(node.children.len() + 1);
                children.push(item.clone());
                children.extend(node.children.iter().cloned());
                out.push(TreeNode {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    children,
                });
            }
        }
    }
    out
}

/// Pre-order depth-first search for the node with `id`.
#[must_use]
pub fn find<'a>(tree: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    for node in tree {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Whether any node in the tree has `id`.
#[must_use]
pub fn contains(tree: &[TreeNode], id: &str) -> bool {
    find(tree, id).is_some()
}

/// Ids of the strict ancestors of `id`, root first, parent last.
///
/// The queried id itself is never part of the result. Returns `None` when
/// `id` is not in the tree and `Some(vec![])` for a root.
#[must_use]
pub fn path_to_item(tree: &[TreeNode], id: &str) -> Option<Vec<String>> {
    let mut path = Vec::new();
    if walk_path(tree, id, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn walk_path(tree: &[TreeNode], id: &str, path: &mut Vec<String>) -> bool {
    for node in tree {
        if node.id == id {
            return true;
        }
        path.push(node.id.clone());
        if walk_path(&node.children, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Every node of the tree except the one with `exclude_id`, pre-order.
///
/// Only that exact node is skipped; its descendants are still listed.
#[must_use]
pub fn move_targets<'a>(tree: &'a [TreeNode], exclude_id: &str) -> Vec<&'a TreeNode> {
    let mut out = Vec::new();
    collect_targets(tree, exclude_id, &mut out);
    out
}

fn collect_targets<'a>(tree: &'a [TreeNode], exclude_id: &str, out: &mut Vec<&'a TreeNode>) {
    for node in tree {
        if node.id != exclude_id {
            out.push(node);
        }
        collect_targets(&node.children, exclude_id, out);
    }
}

/// Direct children of the node with `id`; empty when absent or childless.
#[must_use]
pub fn children_of_item<'a>(tree: &'a [TreeNode], id: &str) -> &'a [TreeNode] {
    find(tree, id).map_or(&[], |node| node.children.as_slice())
}

/// Whether `id` lives strictly below `ancestor_id`.
#[must_use]
pub fn is_descendant_of(tree: &[TreeNode], ancestor_id: &str, id: &str) -> bool {
    find(tree, ancestor_id).is_some_and(|ancestor| contains(&ancestor.children, id))
}

/// All ids of the tree, pre-order.
#[must_use]
pub fn collect_ids(tree: &[TreeNode]) -> Vec<&str> {
    let mut out = Vec::new();
    for node in tree {
        node.collect_ids(&mut out);
    }
    out
}
