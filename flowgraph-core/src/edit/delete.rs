//! Deletion Engine
//!
//! The only way identifiers leave the store. Deleting an element splices its
//! neighbours back together and purges everything nested under it.
//!
//! # Shapes
//!
//! `delete_element` tells its cases apart from the element's position and the
//! optional slot hint, never from an explicit mode:
//!
//! - Hint equal to the slot the target heads: the whole branch is cleared.
//!   The slot becomes empty and the branch chain is purged.
//! - Hint on a branching target: that branch survives and is spliced into the
//!   target's place, ahead of the merge element. A terminal kept branch ends
//!   the chain, so the merge element and whatever followed it go too.
//! - No hint: the target's `next` (a plain successor or a merge element)
//!   takes the target's place.
//!
//! All identifiers are resolved before the store is touched, so a contract
//! error leaves the store as it was.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, instrument, trace};

use super::descendants::DescendantEnumerator;
use crate::error::{FlowError, Result};
use crate::graph::{ChildIndex, Element, ElementId, FlowStore};

/// What a deletion did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// Identifiers removed from the store, in removal order.
    pub removed: Vec<ElementId>,

    /// The element now occupying the deleted element's position.
    pub successor: Option<ElementId>,
}

/// A branch chain lifted out of a deleted branching element.
#[derive(Debug)]
struct KeptBranch {
    first: ElementId,
    last: ElementId,
    is_terminal: bool,
}

impl FlowStore {
    /// Delete an element and restore chain or branch continuity.
    ///
    /// `slot_hint` selects between the shapes described in the module docs.
    /// `descendants` must enumerate everything nested under an element.
    #[instrument(skip(self, descendants))]
    pub fn delete_element<D>(
        &mut self,
        id: &ElementId,
        slot_hint: Option<usize>,
        descendants: &D,
    ) -> Result<DeletionReport>
    where
        D: DescendantEnumerator + ?Sized,
    {
        let target = self.element(id)?.clone();

        let report = match slot_hint {
            None => self.splice_out(&target, None, descendants)?,
            Some(slot) if target.child_index() == Some(ChildIndex::Branch(slot)) => {
                self.vacate_branch(&target, slot, descendants)?
            }
            Some(slot) if target.is_branching() => {
                self.splice_out(&target, Some(slot), descendants)?
            }
            Some(slot) => {
                return Err(FlowError::SlotMismatch {
                    element: id.clone(),
                    slot,
                })
            }
        };

        debug!(removed = report.removed.len(), successor = ?report.successor, "deleted element");
        self.finish_mutation()?;
        Ok(report)
    }

    /// Delete `owner`'s fault chain, if it has one.
    #[instrument(skip(self, descendants))]
    pub fn delete_fault<D>(&mut self, owner: &ElementId, descendants: &D) -> Result<DeletionReport>
    where
        D: DescendantEnumerator + ?Sized,
    {
        let Some(head) = self.element(owner)?.fault().cloned() else {
            trace!("no fault chain to delete");
            return Ok(DeletionReport::default());
        };

        let doomed = self.chain_closure(&head, descendants)?;
        self.element_mut(owner)?.fault = None;
        let report = DeletionReport {
            removed: self.purge(doomed),
            successor: None,
        };

        debug!(%head, removed = report.removed.len(), "deleted fault chain");
        self.finish_mutation()?;
        Ok(report)
    }

    /// Clear the branch slot `target` heads and purge the branch chain.
    fn vacate_branch<D>(&mut self, target: &Element, slot: usize, descendants: &D) -> Result<DeletionReport>
    where
        D: DescendantEnumerator + ?Sized,
    {
        let index = ChildIndex::Branch(slot);
        let parent = target
            .parent()
            .cloned()
            .ok_or_else(|| FlowError::SlotMismatch {
                element: target.id().clone(),
                slot,
            })?;
        self.element(&parent)?.slot(index)?;

        let doomed = self.chain_closure(target.id(), descendants)?;
        *self.element_mut(&parent)?.slot_mut(index)? = None;

        trace!(%parent, %index, "cleared branch slot");
        Ok(DeletionReport {
            removed: self.purge(doomed),
            successor: None,
        })
    }

    /// Remove `target` from its chain, optionally keeping one of its branches
    /// in its place.
    fn splice_out<D>(
        &mut self,
        target: &Element,
        keep: Option<usize>,
        descendants: &D,
    ) -> Result<DeletionReport>
    where
        D: DescendantEnumerator + ?Sized,
    {
        // Resolve everything first.
        let mut kept_ids = IndexSet::new();
        let kept = match keep {
            Some(slot) => match target.slot(ChildIndex::Branch(slot))?.cloned() {
                Some(head) => {
                    kept_ids = self.chain_closure(&head, descendants)?;
                    Some(KeptBranch {
                        last: self.find_last_element(&head)?.id().clone(),
                        is_terminal: self.element(&head)?.is_terminal(),
                        first: head,
                    })
                }
                None => None,
            },
            None => None,
        };

        let mut doomed: IndexSet<ElementId> = std::iter::once(target.id().clone())
            .chain(descendants.descendants_of(self, target))
            .filter(|id| !kept_ids.contains(id))
            .collect();

        let ends_chain = kept.as_ref().is_some_and(|k| k.is_terminal);
        let continuation = match target.next() {
            Some(next) if ends_chain => {
                doomed.extend(self.chain_closure(next, descendants)?);
                None
            }
            Some(next) => Some(self.element(next)?.id().clone()),
            None => None,
        };

        if let Some(prev) = target.prev() {
            self.element(prev)?;
        } else if let (Some(parent), Some(index)) = (target.parent(), target.child_index()) {
            self.element(parent)?.slot(index)?;
        }

        // Then relink.
        let first = match &kept {
            Some(branch) => {
                let head = self.element_mut(&branch.first)?;
                head.clear_head();
                self.element_mut(&branch.last)?.next = continuation.clone();
                if let Some(next) = &continuation {
                    self.element_mut(next)?.prev = Some(branch.last.clone());
                }
                Some(branch.first.clone())
            }
            None => continuation,
        };

        match (target.prev(), target.parent(), target.child_index()) {
            (Some(prev), _, _) => {
                self.element_mut(prev)?.next = first.clone();
                if let Some(first) = &first {
                    self.element_mut(first)?.prev = Some(prev.clone());
                }
            }
            (None, Some(parent), Some(index)) => {
                *self.element_mut(parent)?.slot_mut(index)? = first.clone();
                if let Some(first) = &first {
                    let is_terminal = target.is_terminal() || ends_chain;
                    self.element_mut(first)?
                        .make_head(parent.clone(), index, is_terminal);
                }
            }
            _ => {
                if let Some(first) = &first {
                    self.element_mut(first)?.prev = None;
                }
            }
        }

        Ok(DeletionReport {
            removed: self.purge(doomed),
            successor: first,
        })
    }

    /// Every element of the chain starting at `head`, each followed by its
    /// descendants.
    fn chain_closure<D>(&self, head: &ElementId, descendants: &D) -> Result<IndexSet<ElementId>>
    where
        D: DescendantEnumerator + ?Sized,
    {
        let mut closure = IndexSet::new();
        for id in self.chain_ids(head)? {
            let element = self.element(&id)?;
            let nested = descendants.descendants_of(self, element);
            closure.insert(id);
            closure.extend(nested);
        }
        Ok(closure)
    }

    fn purge(&mut self, doomed: IndexSet<ElementId>) -> Vec<ElementId> {
        doomed
            .into_iter()
            .filter(|id| {
                let removed = self.remove(id).is_some();
                if !removed {
                    trace!(%id, "descendant already absent");
                }
                removed
            })
            .collect()
    }
}
