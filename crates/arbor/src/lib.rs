#![forbid(unsafe_code)]

//! Arbor public facade crate.
//!
//! Re-exports the tree model and engine from `arbor-core` and, with the
//! default `runtime` feature, the store and runtime from `arbor-runtime`.
//! Most applications only need the [`prelude`].

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use arbor_core::engine;
pub use arbor_core::{
    Dispatch, DispatchOutcome, DragKind, DragSource, DropTargetData, HighlightSet, IdGenerator,
    Instruction, ItemMode, LeafNode, LeafPayload, SequentialIds, TreeAction, TreeInstanceId,
    TreeNode, TreeNodeData, UuidGenerator, add_ids_to_tree, apply_instruction, dispatch,
    item_mode,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use arbor_runtime::{
    Cmd, ConfigError, FetchError, FileTransport, JsonSource, LeafCache, LeafError, MemorySource,
    Model, Program, ProgramSimulator, SourceConfig, StoreConfig, Transport, TransportResponse,
    TreeItemCleanup, TreeItemEntry, TreeItemRegistry, TreeMsg, TreeSource, TreeStore,
    TreeViewState,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for arbor apps.
#[derive(Debug)]
pub enum Error {
    /// A source could not deliver a payload.
    #[cfg(feature = "runtime")]
    Fetch(FetchError),
    /// Configuration could not be read.
    #[cfg(feature = "runtime")]
    Config(ConfigError),
    /// Anything else, with a message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "runtime")]
            Self::Fetch(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Config(err) => write!(f, "{err}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "runtime")]
            Self::Fetch(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Config(err) => Some(err),
            Self::Other(_) => None,
        }
    }
}

#[cfg(feature = "runtime")]
impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for arbor APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Construction -----------------------------------------------------------

/// Build a store over local JSON payloads configured from the environment.
///
/// Reads `ARBOR_TREE_DATA_URL`, `ARBOR_ENTRY_DATA_URL` and
/// `ARBOR_LEAF_ERROR_TTL_MS`; malformed values are an error. Payloads are read
/// with [`FileTransport`], so both URLs must be set to `file://` URLs or bare
/// paths. Use [`store_with_transport`] to serve other schemes.
#[cfg(feature = "runtime")]
pub fn store_from_env<H: Clone>() -> Result<TreeStore<H>> {
    store_from_lookup(|var| std::env::var(var).ok())
}

/// Like [`store_from_env`] with a custom variable lookup.
#[cfg(feature = "runtime")]
pub fn store_from_lookup<H: Clone>(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<TreeStore<H>> {
    let config = StoreConfig::try_from_lookup(lookup)?;
    let urls = [
        ("ARBOR_TREE_DATA_URL", &config.source.tree_url),
        ("ARBOR_ENTRY_DATA_URL", &config.source.entry_base_url),
    ];
    for (var, url) in urls {
        if !FileTransport::can_serve(url) {
            return Err(ConfigError::UnsupportedUrl {
                var,
                url: url.clone(),
            }
            .into());
        }
    }
    Ok(build_store(config, FileTransport))
}

/// Build a store whose payloads are fetched through `transport`.
///
/// Configuration is read through `lookup` as in [`store_from_lookup`]; unset
/// URLs keep their defaults.
#[cfg(feature = "runtime")]
pub fn store_with_transport<H: Clone, T: Transport + 'static>(
    transport: T,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<TreeStore<H>> {
    let config = StoreConfig::try_from_lookup(lookup)?;
    Ok(build_store(config, transport))
}

#[cfg(feature = "runtime")]
fn build_store<H: Clone, T: Transport + 'static>(
    config: StoreConfig,
    transport: T,
) -> TreeStore<H> {
    let source = JsonSource::new(config.source.clone(), transport);
    TreeStore::new(std::sync::Arc::new(source), config)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        DragSource, DropTargetData, Error, Instruction, LeafNode, Result, TreeAction,
        TreeInstanceId, TreeNode, TreeNodeData,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        Cmd, Model, Program, ProgramSimulator, StoreConfig, TreeMsg, TreeStore, TreeViewState,
    };
}
