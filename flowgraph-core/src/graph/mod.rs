//! Flow Graph
//!
//! This module implements the data structure behind the canvas: a directed,
//! singly-rooted control-flow graph made of linear chains and branching
//! constructs.
//!
//! # Overview
//!
//! - Elements form doubly-linked chains through `prev`/`next`.
//! - A branching element owns a fixed number of branch slots; each non-empty
//!   slot names the head of a sub-chain. The head points back through
//!   `parent` and `child_index`.
//! - An element with fault handling may own one more chain, the fault chain,
//!   addressed with [`ChildIndex::Fault`].
//! - The element after a branching element is its merge element: branches
//!   that are not terminal rejoin the flow there.
//!
//! # Design Decisions
//!
//! 1. Links are identifiers into a flat table rather than references. The
//!    graph is not a tree (heads point at parents, merge elements are reached
//!    from several branches), and a table that owns every record keeps that
//!    free of shared ownership.
//!
//! 2. The table keeps insertion order, so iteration, validation reports and
//!    purge lists come out the same on every run.
//!
//! 3. A chain edge is written on both of its elements. Selection climbs
//!    towards the root and deletion follows a chain to its tail, and neither
//!    has to search the table to do it.

mod element;
mod invariants;
mod store;

pub use element::{ChildIndex, Element, ElementId, ElementKind, Slots, FAULT_INDEX, MAX_ARITY};
pub use invariants::InvariantViolation;
pub use store::FlowStore;
