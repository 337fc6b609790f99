#![forbid(unsafe_code)]

//! Tree state container.
//!
//! [`TreeStore`] is the single owner of a tree session: the committed tree,
//! the leaf cache, highlight marks, the item registry and the loading/error
//! flags. Every change goes through [`Model::update`] with a [`TreeMsg`];
//! I/O is returned as [`Cmd::Task`] so the store itself never blocks.
//!
//! # Architecture
//!
//! ```text
//!  TreeMsg ──► update ──┬─► arbor_core::dispatch ──► commit tree
//!                       ├─► HighlightSet
//!                       ├─► LeafCache (hit) ──────► open leaf
//!                       └─► Cmd::Task ──► TreeSource ──► TreeLoaded / LeafLoaded
//! ```
//!
//! # Invariants
//!
//! 1. The tree only changes by committing a whole value returned from the
//!    engine, an ingested payload, or [`TreeMsg::SetTree`].
//! 2. A cached leaf is served without calling the source.
//! 3. Failed leaf fetches are never cached.
//! 4. A leaf error is cleared by its own timer only while it is still the
//!    most recent failure (matching `seq`).
//! 5. Every fetch completion clears `loading`, success or failure.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Tree fetch fails | `error` set, tree unchanged |
//! | Leaf fetch fails | `leaf_error` set for the ttl, cache unchanged |
//! | Instruction names a missing node | Logged, tree unchanged |
//! | Drop from another tree instance | Ignored |

use crate::cache::LeafCache;
use crate::config::StoreConfig;
use crate::error::{FetchError, LeafError};
use crate::program::{Cmd, Model};
use crate::registry::TreeItemRegistry;
use crate::source::TreeSource;
use arbor_core::{
    DragKind, DragSource, DropTargetData, HighlightSet, IdGenerator, LeafNode, TreeAction,
    TreeInstanceId, TreeNode, TreeNodeData, UuidGenerator, add_ids_to_tree, dispatch, engine,
};
use std::fmt;
use std::sync::Arc;

/// Messages understood by [`TreeStore`].
#[derive(Debug)]
pub enum TreeMsg {
    /// Fetch the whole tree from the source.
    LoadTree,
    /// Result of a tree fetch.
    TreeLoaded(Result<Vec<TreeNodeData>, FetchError>),
    /// Replace the tree wholesale.
    SetTree(Vec<TreeNode>),
    /// Apply a structural action.
    Dispatch(TreeAction),
    /// A drag ended over one or more drop targets, innermost first.
    Drop {
        source: DragSource,
        targets: Vec<DropTargetData>,
    },
    /// Open leaf `id`, fetching it if it is not cached.
    FetchLeaf(String),
    /// Result of a leaf fetch.
    LeafLoaded {
        id: String,
        result: Result<LeafNode, FetchError>,
    },
    /// Timed clear of the leaf error recorded with `seq`.
    ClearLeafError { id: String, seq: u64 },
    /// Close the open leaf.
    CloseLeaf,
    /// Toggle highlight on node `id` and its subtree.
    ToggleHighlight(String),
}

/// Coarse state for choosing what to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeViewState {
    /// First load in flight, nothing to show yet.
    Loading,
    /// Last tree fetch failed.
    Failed(String),
    /// Loaded, but the tree has no roots.
    Empty,
    Ready,
}

/// Owner of one tree session.
pub struct TreeStore<H> {
    tree: Vec<TreeNode>,
    leaf_cache: LeafCache,
    highlights: HighlightSet,
    registry: TreeItemRegistry<H>,
    loading: bool,
    error: Option<String>,
    open_leaf: Option<LeafNode>,
    leaf_error: Option<LeafError>,
    leaf_error_seq: u64,
    instance_id: TreeInstanceId,
    config: StoreConfig,
    source: Arc<dyn TreeSource>,
    ids: Box<dyn IdGenerator + Send>,
}

impl<H: Clone> TreeStore<H> {
    /// Create an empty store backed by `source`.
    pub fn new(source: Arc<dyn TreeSource>, config: StoreConfig) -> Self {
        Self {
            tree: Vec::new(),
            leaf_cache: LeafCache::new(),
            highlights: HighlightSet::new(),
            registry: TreeItemRegistry::new(),
            loading: false,
            error: None,
            open_leaf: None,
            leaf_error: None,
            leaf_error_seq: 0,
            instance_id: TreeInstanceId::next(),
            config,
            source,
            ids: Box::new(UuidGenerator),
        }
    }

    /// Use `ids` for nodes that arrive without an id.
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + Send + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Start from `tree` instead of an empty tree.
    #[must_use]
    pub fn with_tree(mut self, tree: Vec<TreeNode>) -> Self {
        self.tree = tree;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        engine::find(&self.tree, id)
    }

    /// Ancestor ids of `id`, root first.
    pub fn path_to_item(&self, id: &str) -> Option<Vec<String>> {
        engine::path_to_item(&self.tree, id)
    }

    /// Every node except `id`, for a "move to" menu.
    pub fn move_targets(&self, id: &str) -> Vec<&TreeNode> {
        engine::move_targets(&self.tree, id)
    }

    pub fn children_of_item(&self, id: &str) -> &[TreeNode] {
        engine::children_of_item(&self.tree, id)
    }

    pub fn leaf_cache(&self) -> &LeafCache {
        &self.leaf_cache
    }

    pub fn open_leaf(&self) -> Option<&LeafNode> {
        self.open_leaf.as_ref()
    }

    pub fn leaf_error(&self) -> Option<&LeafError> {
        self.leaf_error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed tree fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.highlights.is_highlighted(id)
    }

    pub fn registry(&self) -> &TreeItemRegistry<H> {
        &self.registry
    }

    pub fn instance_id(&self) -> TreeInstanceId {
        self.instance_id
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn view_state(&self) -> TreeViewState {
        if let Some(message) = &self.error {
            return TreeViewState::Failed(message.clone());
        }
        match (self.loading, self.tree.is_empty()) {
            (true, true) => TreeViewState::Loading,
            (false, true) => TreeViewState::Empty,
            _ => TreeViewState::Ready,
        }
    }

    // ── Transitions ──────────────────────────────────────────────────────

    fn load_tree(&mut self) -> Cmd<TreeMsg> {
        self.loading = true;
        self.error = None;
        let source = Arc::clone(&self.source);
        tracing::debug!(source = source.name(), "loading tree");
        Cmd::task_named("fetch_tree", move || TreeMsg::TreeLoaded(source.fetch_tree()))
    }

    fn tree_loaded(&mut self, result: Result<Vec<TreeNodeData>, FetchError>) {
        self.loading = false;
        match result {
            Ok(payload) => {
                let tree = add_ids_to_tree(payload, &mut *self.ids);
                tracing::info!(roots = tree.len(), "tree loaded");
                self.tree = tree;
            }
            Err(err) => {
                tracing::warn!(error = %err, "tree fetch failed");
                self.error = Some(err.to_string());
            }
        }
    }

    fn apply_action(&mut self, action: &TreeAction) {
        let result = dispatch(&self.tree, action);
        if result.is_applied() {
            tracing::debug!(?action, "tree action applied");
        } else {
            tracing::debug!(?action, outcome = %result.outcome, "tree action ignored");
        }
        self.tree = result.tree;
    }

    fn drop_on(&mut self, source: &DragSource, targets: &[DropTargetData]) {
        if !self.instance_id.accepts(source) || source.kind != DragKind::TreeNode {
            tracing::trace!(
                instance = %self.instance_id,
                from = %source.instance,
                "drop from foreign source ignored"
            );
            return;
        }
        let Some(target) = targets.first() else {
            return;
        };
        let Some(instruction) = &target.instruction else {
            return;
        };
        let action =
            TreeAction::instruction(source.item_id.clone(), target.target_id.clone(), *instruction);
        self.apply_action(&action);
    }

    fn fetch_leaf(&mut self, id: String) -> Cmd<TreeMsg> {
        if let Some(leaf) = self.leaf_cache.get(&id) {
            tracing::trace!(id = %id, "leaf cache hit");
            self.open_leaf = Some(leaf.clone());
            return Cmd::none();
        }
        self.loading = true;
        self.error = None;
        let source = Arc::clone(&self.source);
        tracing::debug!(id = %id, source = source.name(), "fetching leaf");
        Cmd::task_named("fetch_leaf", move || {
            let result = source
                .fetch_leaf(&id)
                .map(|payload| LeafNode::from_payload(id.clone(), payload));
            TreeMsg::LeafLoaded { id, result }
        })
    }

    fn leaf_loaded(&mut self, id: String, result: Result<LeafNode, FetchError>) -> Cmd<TreeMsg> {
        self.loading = false;
        match result {
            Ok(leaf) => {
                if self.leaf_error.as_ref().is_some_and(|e| e.id == id) {
                    self.leaf_error = None;
                }
                self.leaf_cache.insert(leaf.clone());
                self.open_leaf = Some(leaf);
                Cmd::none()
            }
            Err(err) => {
                self.leaf_error_seq += 1;
                let seq = self.leaf_error_seq;
                tracing::warn!(id = %id, seq, error = %err, "leaf fetch failed");
                self.leaf_error = Some(LeafError {
                    id: id.clone(),
                    message: err.to_string(),
                    seq,
                });
                Cmd::after(self.config.leaf_error_ttl, TreeMsg::ClearLeafError { id, seq })
            }
        }
    }

    fn clear_leaf_error(&mut self, id: &str, seq: u64) {
        if self
            .leaf_error
            .as_ref()
            .is_some_and(|e| e.id == id && e.seq == seq)
        {
            tracing::trace!(id, seq, "leaf error cleared");
            self.leaf_error = None;
        }
    }

    fn toggle_highlight(&mut self, id: &str) {
        let Some(node) = engine::find(&self.tree, id) else {
            tracing::trace!(id, "highlight toggle for unknown node");
            return;
        };
        let on = self.highlights.toggle_highlight(node);
        tracing::trace!(id, on, "highlight toggled");
    }
}

impl<H: Clone> Model for TreeStore<H> {
    type Message = TreeMsg;

    fn init(&mut self) -> Cmd<TreeMsg> {
        self.load_tree()
    }

    fn update(&mut self, msg: TreeMsg) -> Cmd<TreeMsg> {
        match msg {
            TreeMsg::LoadTree => return self.load_tree(),
            TreeMsg::TreeLoaded(result) => self.tree_loaded(result),
            TreeMsg::SetTree(tree) => self.tree = tree,
            TreeMsg::Dispatch(action) => self.apply_action(&action),
            TreeMsg::Drop { source, targets } => self.drop_on(&source, &targets),
            TreeMsg::FetchLeaf(id) => return self.fetch_leaf(id),
            TreeMsg::LeafLoaded { id, result } => return self.leaf_loaded(id, result),
            TreeMsg::ClearLeafError { id, seq } => self.clear_leaf_error(&id, seq),
            TreeMsg::CloseLeaf => self.open_leaf = None,
            TreeMsg::ToggleHighlight(id) => self.toggle_highlight(&id),
        }
        Cmd::none()
    }
}

impl<H> fmt::Debug for TreeStore<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeStore")
            .field("instance_id", &self.instance_id)
            .field("roots", &self.tree.len())
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("leaf_error", &self.leaf_error)
            .field("cached_leaves", &self.leaf_cache.len())
            .field("source", &self.source.name())
            .finish()
    }
}
