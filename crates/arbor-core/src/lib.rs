#![forbid(unsafe_code)]

//! Core: tree model, structural mutation engine, instruction dispatch and
//! subtree highlighting.
//!
//! Everything in this crate is a pure function of its inputs. State lives in
//! `arbor-runtime`, which passes tree values in and commits the values that
//! come back.

pub mod dispatch;
pub mod engine;
pub mod highlight;
pub mod ingest;
pub mod instruction;
pub mod item_mode;
pub mod node;
pub mod session;

pub use dispatch::{Dispatch, DispatchOutcome, apply_instruction, dispatch};
pub use highlight::HighlightSet;
pub use ingest::{IdGenerator, SequentialIds, UuidGenerator, add_ids_to_tree};
pub use instruction::{Instruction, TreeAction};
pub use item_mode::{ItemMode, item_mode};
pub use node::{LeafNode, LeafPayload, TreeNode, TreeNodeData};
pub use session::{DragKind, DragSource, DropTargetData, TreeInstanceId};
