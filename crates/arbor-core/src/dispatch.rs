#![forbid(unsafe_code)]

//! Instruction dispatch: turns a `(item, target, instruction)` triple into
//! the next tree value.
//!
//! Each dispatch is evaluated independently against the tree it is given.
//! The item is always removed before it is re-inserted, so an insert can
//! never see the item's old position.
//!
//! # Failure Modes
//!
//! | Outcome | Cause | Result |
//! |---------|-------|--------|
//! | `ItemNotFound` | stale drag reference | tree unchanged |
//! | `TargetNotFound` | target removed mid-drag | tree unchanged |
//! | `PathNotFound` | reparent target missing | tree unchanged |
//! | `LevelOutOfRange` | reparent deeper than the target's path | tree unchanged |
//! | `TargetInsideItem` | anchor is the item or one of its descendants | tree unchanged |
//!
//! None of these are errors: the caller gets a tree back either way and the
//! outcome is only useful for diagnostics.

use crate::engine::{
    contains, find, insert_after, insert_before, insert_child, path_to_item, remove,
};
use crate::instruction::{Instruction, TreeAction};
use crate::node::TreeNode;
use std::fmt;

/// Why a dispatch did or did not change the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The item was moved.
    Applied,
    /// The dragged item is not in the tree.
    ItemNotFound,
    /// The drop target is not in the tree.
    TargetNotFound,
    /// Reparent target has no path (not in the tree).
    PathNotFound,
    /// Reparent asked for an ancestor level the target does not have.
    LevelOutOfRange { desired_level: usize, depth: usize },
    /// The insertion anchor is the item itself or lies inside its subtree.
    TargetInsideItem,
}

impl DispatchOutcome {
    /// Stable name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::ItemNotFound => "item_not_found",
            Self::TargetNotFound => "target_not_found",
            Self::PathNotFound => "path_not_found",
            Self::LevelOutOfRange { .. } => "level_out_of_range",
            Self::TargetInsideItem => "target_inside_item",
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelOutOfRange {
                desired_level,
                depth,
            } => write!(f, "level {desired_level} out of range (depth {depth})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Result of a dispatch: the next tree plus what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub tree: Vec<TreeNode>,
    pub outcome: DispatchOutcome,
}

impl Dispatch {
    fn unchanged(tree: &[TreeNode], outcome: DispatchOutcome) -> Self {
        Self {
            tree: tree.to_vec(),
            outcome,
        }
    }

    /// Whether the tree changed.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.outcome == DispatchOutcome::Applied
    }
}

/// Apply a [`TreeAction`] to `tree`.
#[must_use]
pub fn dispatch(tree: &[TreeNode], action: &TreeAction) -> Dispatch {
    match action {
        TreeAction::Instruction {
            item_id,
            target_id,
            instruction,
        } => apply_instruction(tree, item_id, target_id, instruction),
    }
}

/// Move `item_id` relative to `target_id` as `instruction` describes.
#[must_use]
pub fn apply_instruction(
    tree: &[TreeNode],
    item_id: &str,
    target_id: &str,
    instruction: &Instruction,
) -> Dispatch {
    let Some(item) = find(tree, item_id) else {
        return Dispatch::unchanged(tree, DispatchOutcome::ItemNotFound);
    };

    let anchor: &str = match instruction {
        Instruction::ReorderAbove | Instruction::ReorderBelow | Instruction::MakeChild => {
            if !contains(tree, target_id) {
                return Dispatch::unchanged(tree, DispatchOutcome::TargetNotFound);
            }
            target_id
        }
        Instruction::Reparent { desired_level } => {
            let Some(path) = path_to_item(tree, target_id) else {
                return Dispatch::unchanged(tree, DispatchOutcome::PathNotFound);
            };
            let Some(ancestor) = path.get(*desired_level) else {
                return Dispatch::unchanged(
                    tree,
                    DispatchOutcome::LevelOutOfRange {
                        desired_level: *desired_level,
                        depth: path.len(),
                    },
                );
            };
            // Borrow the id out of the tree so `path` can be dropped here.
            match find(tree, ancestor) {
                Some(node) => node.id.as_str(),
                None => return Dispatch::unchanged(tree, DispatchOutcome::PathNotFound),
            }
        }
    };

    // Once the item is removed an anchor inside it would vanish and the
    // item would be lost along with it.
    if anchor == item.id || contains(&item.children, anchor) {
        return Dispatch::unchanged(tree, DispatchOutcome::TargetInsideItem);
    }

    let without = remove(tree, item_id);
    let next = match instruction {
        Instruction::ReorderAbove => insert_before(&without, anchor, item),
        Instruction::ReorderBelow | Instruction::Reparent { .. } => {
            insert_after(&without, anchor, item)
        }
        Instruction::MakeChild => insert_child(&without, anchor, item),
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(
        item_id,
        target_id,
        anchor,
        instruction = instruction.type_name(),
        "instruction applied"
    );

    Dispatch {
        tree: next,
        outcome: DispatchOutcome::Applied,
    }
}
