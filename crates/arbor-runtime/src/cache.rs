#![forbid(unsafe_code)]

//! Memo of fetched leaf metadata.
//!
//! Populated once per id and read many times. No eviction, no TTL: an entry
//! lives as long as the store. Failed fetches are never cached, so a retry
//! always reaches the source.

use arbor_core::LeafNode;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct LeafCache {
    entries: HashMap<String, LeafNode>,
}

impl LeafCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LeafNode> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Store `leaf` under its own id. A later response for the same id
    /// replaces the earlier one.
    pub fn insert(&mut self, leaf: LeafNode) {
        self.entries.insert(leaf.id.clone(), leaf);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
