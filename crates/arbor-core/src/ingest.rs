#![forbid(unsafe_code)]

//! Id assignment for freshly fetched tree payloads.
//!
//! Runs once, before a payload is handed to the engine. Nodes that arrive
//! with a non-blank id keep it; every other node gets a generated one.

use crate::node::{TreeNode, TreeNodeData};

/// Source of fresh, unique node ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs. The default generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// `{prefix}{n}` ids counting up from 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

impl<F: FnMut() -> String> IdGenerator for F {
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Convert a payload into a tree, filling in missing ids.
///
/// The generator is called exactly once per node whose id is absent or
/// blank, in pre-order. Missing children become an empty list.
#[must_use]
pub fn add_ids_to_tree<G>(nodes: Vec<TreeNodeData>, ids: &mut G) -> Vec<TreeNode>
where
    G: IdGenerator + ?Sized,
{
    nodes
        .into_iter()
        .map(|node| {
            let id = match node.id {
                Some(id) if !id.trim().is_empty() => id,
                _ => ids.next_id(),
            };
            let children = node
                .children
                .map(|children| add_ids_to_tree(children, ids))
                .unwrap_or_default();
            TreeNode {
                id,
                label: node.label,
                children,
            }
        })
        .collect()
}
