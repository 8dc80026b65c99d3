//! Range Selection
//!
//! Multi-element selection on the canvas works on contiguous runs of a
//! chain. Selecting a branching element always takes its branches with it.
//!
//! The resolver never writes selection flags itself; it reports what should
//! change in a [`SelectionUpdate`], which the caller applies (usually through
//! [`FlowStore::apply_selection`](crate::graph::FlowStore::apply_selection))
//! before re-rendering.

mod resolver;
mod subtree;

pub use resolver::SelectionUpdate;
pub use subtree::SelectionAction;
