#![forbid(unsafe_code)]

//! Runtime: the tree store, its data sources and the message loop that
//! drives it.
//!
//! [`TreeStore`] is an Elm-style [`Model`]. Run it with [`Program`] for real
//! threads and timers, or with [`ProgramSimulator`] in tests.

pub mod cache;
pub mod config;
pub mod error;
pub mod program;
pub mod registry;
pub mod simulator;
pub mod source;
pub mod store;

pub use cache::LeafCache;
pub use config::{SourceConfig, StoreConfig};
pub use error::{ConfigError, FetchError, FetchResult, LeafError};
pub use program::{Cmd, Model, Program, TaskSpec};
pub use registry::{TreeItemCleanup, TreeItemEntry, TreeItemRegistry};
pub use simulator::{CmdRecord, ProgramSimulator};
pub use source::{
    FileTransport, JsonSource, MemorySource, Transport, TransportResponse, TreeSource,
};
pub use store::{TreeMsg, TreeStore, TreeViewState};
