#![forbid(unsafe_code)]

//! Drag-completion instructions and the actions that carry them.
//!
//! Instructions are produced by the drag hit-test layer from pointer
//! geometry and consumed, never modified, by [`crate::dispatch`].
//!
//! On the wire an instruction is an internally tagged object:
//!
//! ```json
//! { "type": "reparent", "desiredLevel": 1 }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a dragged item should be placed relative to its drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "kebab-case"))]
pub enum Instruction {
    /// Sibling immediately above the target.
    ReorderAbove,
    /// Sibling immediately below the target.
    ReorderBelow,
    /// First child of the target.
    MakeChild,
    /// Sibling immediately below the target's ancestor at `desired_level`.
    ///
    /// Level 0 is the target's root ancestor.
    Reparent {
        #[cfg_attr(feature = "serde", serde(rename = "desiredLevel"))]
        desired_level: usize,
    },
}

impl Instruction {
    /// Stable wire name of the variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::ReorderAbove => "reorder-above",
            Self::ReorderBelow => "reorder-below",
            Self::MakeChild => "make-child",
            Self::Reparent { .. } => "reparent",
        }
    }

    /// The requested nesting depth, for `Reparent` only.
    #[must_use]
    pub const fn desired_level(&self) -> Option<usize> {
        match self {
            Self::Reparent { desired_level } => Some(*desired_level),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reparent { desired_level } => write!(f, "reparent@{desired_level}"),
            other => f.write_str(other.type_name()),
        }
    }
}

/// Unit of work submitted to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "kebab-case"))]
pub enum TreeAction {
    /// Move `item_id` relative to `target_id` as `instruction` says.
    #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
    Instruction {
        item_id: String,
        target_id: String,
        instruction: Instruction,
    },
}

impl TreeAction {
    /// Build an instruction action.
    #[must_use]
    pub fn instruction(
        item_id: impl Into<String>,
        target_id: impl Into<String>,
        instruction: Instruction,
    ) -> Self {
        Self::Instruction {
            item_id: item_id.into(),
            target_id: target_id.into(),
            instruction,
        }
    }
}
