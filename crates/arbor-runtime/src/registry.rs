#![forbid(unsafe_code)]

//! Registry of mounted tree-item handles.
//!
//! The UI layer registers the interactive handles of each tree item when it
//! mounts and calls the returned cleanup when it unmounts. Drag wiring then
//! looks items up by id. Entry lifetime follows the UI component, not the
//! tree node: a node can be in the tree without being registered (collapsed
//! ancestor, virtualized row).
//!
//! # Invariants
//!
//! 1. `register` overwrites any previous entry for the same id.
//! 2. [`TreeItemCleanup::cleanup`] removes the entry for the id it was
//!    created with, whatever is stored there now. Callers must run the
//!    cleanup of an old mount before registering the new one.
//! 3. Entries are only removed by an explicit cleanup; dropping the cleanup
//!    value does nothing.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Handles registered for one tree item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItemEntry<H> {
    pub element: H,
    pub action_menu_trigger: H,
}

/// Shared map from item id to its mounted handles.
///
/// Cloning is cheap and every clone sees the same entries.
pub struct TreeItemRegistry<H> {
    entries: Arc<RwLock<HashMap<String, TreeItemEntry<H>>>>,
}

impl<H> Clone for TreeItemRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<H> Default for TreeItemRegistry<H> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<H: Clone> TreeItemRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store handles for `item_id` and return the matching cleanup.
    #[must_use = "dropping the cleanup leaves the entry registered"]
    pub fn register(
        &self,
        item_id: impl Into<String>,
        element: H,
        action_menu_trigger: H,
    ) -> TreeItemCleanup<H> {
        let item_id = item_id.into();
        let replaced = self
            .write()
            .insert(
                item_id.clone(),
                TreeItemEntry {
                    element,
                    action_menu_trigger,
                },
            )
            .is_some();
        tracing::trace!(item_id = %item_id, replaced, "tree item registered");
        TreeItemCleanup {
            entries: Arc::clone(&self.entries),
            item_id,
        }
    }

    /// Handles for `item_id`, if mounted.
    #[must_use]
    pub fn get(&self, item_id: &str) -> Option<TreeItemEntry<H>> {
        self.read().get(item_id).cloned()
    }

    #[must_use]
    pub fn contains(&self, item_id: &str) -> bool {
        self.read().contains_key(item_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered ids, unordered.
    #[must_use]
    pub fn item_ids(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, TreeItemEntry<H>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, TreeItemEntry<H>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H> fmt::Debug for TreeItemRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.entries.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("TreeItemRegistry")
            .field("entries", &count)
            .finish()
    }
}

/// Removes one registration when [`cleanup`](Self::cleanup) is called.
pub struct TreeItemCleanup<H> {
    entries: Arc<RwLock<HashMap<String, TreeItemEntry<H>>>>,
    item_id: String,
}

impl<H> TreeItemCleanup<H> {
    /// Id this cleanup was created for.
    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Remove the entry stored under this cleanup's id.
    pub fn cleanup(self) {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.item_id)
            .is_some();
        tracing::trace!(item_id = %self.item_id, removed, "tree item unregistered");
    }
}

impl<H> fmt::Debug for TreeItemCleanup<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeItemCleanup")
            .field("item_id", &self.item_id)
            .finish()
    }
}
