//! Flowgraph Core
//!
//! This crate provides the graph model behind a flow canvas editor. A flow
//! is a directed, singly-rooted control-flow structure: linear sequences of
//! steps interspersed with branching constructs (decisions, loops, wait
//! events) and optional per-step fault handlers. The canvas edits it one
//! element at a time, and after every edit the graph must still be
//! consistent and renderable.
//!
//! It implements:
//!
//! - The element store and its invariants
//! - Linking elements into chains and branch/fault slots
//! - Deletion with re-linking and subtree purge
//! - Range selection across chains and branches
//!
//! Rendering, layout, persistence and undo history are left to the editor.
//!
//! # Architecture
//!
//! - `graph`: element records, the store, and the invariant checker
//! - `edit`: linking, chain walks, and deletion
//! - `selection`: range selection and subtree expansion
//! - `shared`: a lock-guarded handle for multi-threaded hosts
//!
//! # Example
//!
//! ```rust
//! use flowgraph_core::edit::NestedDescendants;
//! use flowgraph_core::graph::{ChildIndex, Element, ElementId, FlowStore};
//!
//! # fn main() -> flowgraph_core::Result<()> {
//! let mut store = FlowStore::new();
//! store.add_root(Element::step("start"))?;
//! store.link_element(Element::branching("decision", 2)?.with_prev("start"))?;
//! store.link_element(Element::step("end").with_prev("decision"))?;
//!
//! let decision = ElementId::from("decision");
//! store.link_branch_or_fault(&decision, ChildIndex::Branch(0), Some(Element::step("yes")))?;
//!
//! // Removing the decision purges its branches and joins start to end.
//! store.delete_element(&decision, None, &NestedDescendants)?;
//! assert_eq!(store.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod edit;
pub mod error;
pub mod graph;
pub mod selection;
pub mod shared;

pub use config::StoreConfig;
pub use error::{FlowError, Result};
pub use graph::{ChildIndex, Element, ElementId, ElementKind, FlowStore, FAULT_INDEX, MAX_ARITY};
pub use shared::SharedFlowStore;
