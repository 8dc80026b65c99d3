//! Graph Editing
//!
//! Incremental edits to a [`FlowStore`](crate::graph::FlowStore): one element
//! inserted, attached to a branch, or removed at a time. Each edit leaves the
//! store consistent, so the canvas can re-render after every gesture.
//!
//! - `link`: splice into a chain, or attach as a branch/fault head
//! - `walk`: find the ends of a chain
//! - `delete`: remove elements and purge what was nested under them
//! - `descendants`: the strategy deletion uses to find nested elements

mod delete;
mod descendants;
mod link;
mod walk;

pub use delete::DeletionReport;
pub use descendants::{DescendantEnumerator, NestedDescendants};
