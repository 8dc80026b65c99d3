//! Error Types
//!
//! Every fallible operation on the flow graph reports a [`FlowError`].
//!
//! All variants describe a broken calling contract: a dangling identifier,
//! a slot index the parent does not have, a cycle in the links. None of them
//! are meant to be retried. Conditions that are harmless by nature (linking
//! nothing into a slot, deleting a fault that is not there) are not errors at
//! all and succeed as no-ops.

use thiserror::Error;

use crate::graph::{ChildIndex, ElementId, InvariantViolation};

/// Errors raised by flow graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// An identifier does not resolve in the store.
    #[error("element '{0}' is not in the store")]
    MissingElement(ElementId),

    /// An element with this identifier has already been inserted.
    #[error("element '{0}' is already in the store")]
    DuplicateElement(ElementId),

    /// An element handed to a linker already carries linkage it should not.
    #[error("element '{0}' is already linked into the graph")]
    AlreadyLinked(ElementId),

    /// An inline link was requested without naming the previous element.
    #[error("element '{0}' names no previous element to be linked after")]
    MissingPrev(ElementId),

    /// The `prev`/`next` pair named by an element are not neighbours.
    #[error("'{prev}' is not directly followed by {next:?}; cannot insert '{element}' between them")]
    NotAdjacent {
        element: ElementId,
        prev: ElementId,
        next: Option<ElementId>,
    },

    /// A branch slot was addressed on an element with no branches.
    #[error("element '{0}' has no branches")]
    NotBranching(ElementId),

    /// A branch slot index is past the parent's arity.
    #[error("slot {slot} is out of range for '{parent}' with {arity} branches")]
    SlotOutOfRange {
        parent: ElementId,
        slot: usize,
        arity: usize,
    },

    /// A fault slot was addressed on an element without fault handling.
    #[error("element '{0}' does not support fault handling")]
    FaultUnsupported(ElementId),

    /// An operation needed the head of a slot that is empty.
    #[error("{index} of '{parent}' is empty")]
    EmptySlot { parent: ElementId, index: ChildIndex },

    /// A slot hint passed to deletion matches neither deletion shape.
    #[error("slot hint {slot} does not apply to element '{element}'")]
    SlotMismatch { element: ElementId, slot: usize },

    /// A raw child index is neither a branch slot nor the fault sentinel.
    #[error("invalid child index {0}")]
    InvalidChildIndex(i32),

    /// A branch slot is too large for the raw child index form.
    #[error("branch slot {0} has no raw child index")]
    UnrepresentableSlot(usize),

    /// A branching element was declared with fewer than two branches, or
    /// more than the raw child index can address.
    #[error("unsupported branch count {0}")]
    InvalidArity(usize),

    /// A record's branch slots do not match its declared kind.
    #[error("element '{element}' declares {arity} branches but carries {slots} slots")]
    SlotCountMismatch {
        element: ElementId,
        arity: usize,
        slots: usize,
    },

    /// A walk visited more elements than the store holds.
    #[error("cycle detected while walking from '{0}'")]
    Cycle(ElementId),

    /// A selection gesture targeted an element unrelated to the current run.
    #[error("element '{element}' is outside the range selectable from '{top}'")]
    OutsideSelectableRange { element: ElementId, top: ElementId },

    /// The store failed validation after a mutation.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

impl FlowError {
    pub(crate) fn slot_out_of_range(parent: &ElementId, slot: ChildIndex, arity: usize) -> Self {
        match slot {
            ChildIndex::Branch(slot) => Self::SlotOutOfRange {
                parent: parent.clone(),
                slot,
                arity,
            },
            ChildIndex::Fault => Self::FaultUnsupported(parent.clone()),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = FlowError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_element() {
        let err = FlowError::MissingElement(ElementId::from("screen-1"));
        assert_eq!(err.to_string(), "element 'screen-1' is not in the store");

        let err = FlowError::SlotOutOfRange {
            parent: ElementId::from("decision"),
            slot: 3,
            arity: 2,
        };
        assert!(err.to_string().contains("decision"));
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn fault_slot_maps_to_fault_unsupported() {
        let parent = ElementId::from("assignment");
        assert_eq!(
            FlowError::slot_out_of_range(&parent, ChildIndex::Fault, 0),
            FlowError::FaultUnsupported(parent)
        );
    }
}
