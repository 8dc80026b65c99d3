//! Invariant Checker
//!
//! Full-store consistency check. Every mutation in this crate is expected to
//! leave the store in a state where [`FlowStore::validate`] succeeds:
//!
//! 1. `prev`/`next` links are symmetric.
//! 2. A branch slot and its head agree on parent and slot index.
//! 3. A fault slot and its head agree the same way, with the fault index.
//! 4. Heads have no `prev`.
//! 5. No identifier is referenced from more than one `next`, branch slot or
//!    fault slot.
//! 6. No link names an identifier that is not in the store.
//! 7. Every element reaches a root by climbing `prev` links, and `parent` at
//!    each head.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::element::{ChildIndex, ElementId};
use super::store::FlowStore;

/// A broken store invariant, as found by [`FlowStore::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("'{from}' links to '{to}', which is not in the store")]
    DanglingReference { from: ElementId, to: ElementId },

    #[error("'{from}'.next is '{to}' but '{to}'.prev is {found:?}")]
    AsymmetricNext {
        from: ElementId,
        to: ElementId,
        found: Option<ElementId>,
    },

    #[error("'{from}'.prev is '{to}' but '{to}'.next is {found:?}")]
    AsymmetricPrev {
        from: ElementId,
        to: ElementId,
        found: Option<ElementId>,
    },

    #[error("{index} of '{parent}' holds '{head}', which does not point back at it")]
    SlotMismatch {
        parent: ElementId,
        index: ChildIndex,
        head: ElementId,
    },

    #[error("'{head}' claims {index} of '{parent}', which does not hold it")]
    OrphanedHead {
        parent: ElementId,
        index: ChildIndex,
        head: ElementId,
    },

    #[error("'{0}' has only half of its parent/child index linkage")]
    PartialHeadLinkage(ElementId),

    #[error("head '{0}' has a previous element")]
    HeadWithPrev(ElementId),

    #[error("'{0}' is referenced from more than one next, branch or fault link")]
    AliasedReference(ElementId),

    #[error("'{0}' sits on a loop and reaches no root")]
    Unrooted(ElementId),
}

impl FlowStore {
    /// Check every store invariant, reporting the first violation found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut owners: HashMap<&ElementId, usize> = HashMap::new();

        for element in self.iter() {
            let id = element.id();

            for target in element
                .prev()
                .into_iter()
                .chain(element.next())
                .chain(element.parent())
                .chain(element.fault())
                .chain(element.children().iter().flatten())
            {
                if !self.contains(target) {
                    return Err(InvariantViolation::DanglingReference {
                        from: id.clone(),
                        to: target.clone(),
                    });
                }
            }

            if let Some(next) = element.next() {
                let found = self.get(next).and_then(|n| n.prev());
                if found != Some(id) {
                    return Err(InvariantViolation::AsymmetricNext {
                        from: id.clone(),
                        to: next.clone(),
                        found: found.cloned(),
                    });
                }
            }

            if let Some(prev) = element.prev() {
                let found = self.get(prev).and_then(|p| p.next());
                if found != Some(id) {
                    return Err(InvariantViolation::AsymmetricPrev {
                        from: id.clone(),
                        to: prev.clone(),
                        found: found.cloned(),
                    });
                }
            }

            let slots = element
                .children()
                .iter()
                .enumerate()
                .filter_map(|(i, head)| head.as_ref().map(|h| (ChildIndex::Branch(i), h)))
                .chain(element.fault().map(|h| (ChildIndex::Fault, h)));
            for (index, head) in slots {
                let agrees = self
                    .get(head)
                    .is_some_and(|h| h.parent() == Some(id) && h.child_index() == Some(index));
                if !agrees {
                    return Err(InvariantViolation::SlotMismatch {
                        parent: id.clone(),
                        index,
                        head: head.clone(),
                    });
                }
            }

            match (element.parent(), element.child_index()) {
                (Some(parent), Some(index)) => {
                    let held = self
                        .get(parent)
                        .and_then(|p| p.slot(index).ok().flatten());
                    if held != Some(id) {
                        return Err(InvariantViolation::OrphanedHead {
                            parent: parent.clone(),
                            index,
                            head: id.clone(),
                        });
                    }
                    if element.prev().is_some() {
                        return Err(InvariantViolation::HeadWithPrev(id.clone()));
                    }
                }
                (None, None) => {}
                _ => return Err(InvariantViolation::PartialHeadLinkage(id.clone())),
            }

            for owned in element
                .next()
                .into_iter()
                .chain(element.fault())
                .chain(element.children().iter().flatten())
            {
                let count = owners.entry(owned).or_insert(0);
                *count += 1;
                if *count > 1 {
                    return Err(InvariantViolation::AliasedReference(owned.clone()));
                }
            }
        }

        self.check_rooted()
    }

    /// Climb from every element towards a root. Elements already known to
    /// reach one end the climb early.
    fn check_rooted(&self) -> Result<(), InvariantViolation> {
        let mut rooted: HashSet<&ElementId> = HashSet::new();

        for element in self.iter() {
            let mut path = Vec::new();
            let mut current = element;
            loop {
                if rooted.contains(current.id()) {
                    break;
                }
                if path.len() > self.len() {
                    return Err(InvariantViolation::Unrooted(element.id().clone()));
                }
                path.push(current.id());
                match current.prev().or(current.parent()).and_then(|up| self.get(up)) {
                    Some(up) => current = up,
                    None => break,
                }
            }
            rooted.extend(path);
        }

        Ok(())
    }
}
