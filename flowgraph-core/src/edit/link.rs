//! Chain and Branch Linkers
//!
//! New elements arrive from the element factory fully populated except for
//! their links. These operations make them reachable: either spliced between
//! two neighbours of an existing chain, or attached as the head of a branch
//! or fault slot.

use tracing::{debug, instrument, trace};

use crate::error::{FlowError, Result};
use crate::graph::{ChildIndex, Element, ElementId, FlowStore};

impl FlowStore {
    /// Splice `element` into a chain between `element.prev` and `element.next`.
    ///
    /// `element.prev` must name an existing element whose current `next` is
    /// `element.next`, or the tail of a chain when `element.next` is a free
    /// root, in which case the two chains are joined. A missing
    /// `element.next` appends after the chain's tail. Branch and fault fields
    /// are left alone.
    #[instrument(skip(self, element), fields(id = %element.id()))]
    pub fn link_element(&mut self, element: Element) -> Result<()> {
        self.check_insertable(&element)?;

        let id = element.id().clone();
        let prev_id = element
            .prev()
            .cloned()
            .ok_or_else(|| FlowError::MissingPrev(id.clone()))?;

        let prev = self.element(&prev_id)?;
        let joins_loose_ends = match element.next() {
            Some(next) => {
                let next = self.element(next)?;
                prev.next().is_none()
                    && next.is_root()
                    && self.find_root(&prev_id)?.id() != next.id()
            }
            None => false,
        };
        if prev.next() != element.next() && !joins_loose_ends {
            return Err(FlowError::NotAdjacent {
                element: id,
                prev: prev_id,
                next: element.next().cloned(),
            });
        }

        self.element_mut(&prev_id)?.next = Some(id.clone());
        if let Some(next) = element.next() {
            self.element_mut(next)?.prev = Some(id.clone());
        }

        debug!(prev = %prev_id, next = ?element.next(), "linked element into chain");
        self.insert(element);
        self.finish_mutation()
    }

    /// Attach `element` as the head of `parent`'s `index` slot.
    ///
    /// A pre-existing head is pushed down to become the new head's `next`,
    /// and the new head takes over its terminal flag. A head placed in an
    /// empty slot is terminal only for fault chains, which never merge back.
    ///
    /// Passing `None` is a no-op; clearing a slot is done through deletion.
    #[instrument(skip(self, element), fields(id = ?element.as_ref().map(Element::id)))]
    pub fn link_branch_or_fault(
        &mut self,
        parent: &ElementId,
        index: ChildIndex,
        element: Option<Element>,
    ) -> Result<()> {
        let Some(mut element) = element else {
            trace!(%parent, %index, "nothing to link");
            return Ok(());
        };
        self.check_insertable(&element)?;

        let id = element.id().clone();
        let previous_head = self.element(parent)?.slot(index)?.cloned();
        let is_terminal = match &previous_head {
            Some(head) => self.element(head)?.is_terminal(),
            None => index.is_fault(),
        };

        element.make_head(parent.clone(), index, is_terminal);
        element.next = previous_head.clone();

        if let Some(head) = &previous_head {
            let head = self.element_mut(head)?;
            head.prev = Some(id.clone());
            head.clear_head();
        }
        *self.element_mut(parent)?.slot_mut(index)? = Some(id.clone());

        debug!(%parent, %index, previous_head = ?previous_head, is_terminal, "linked head");
        self.insert(element);
        self.finish_mutation()
    }

    /// Mark the chain in `parent`'s `index` slot as terminal or merging.
    ///
    /// The flag lives on the chain's head, so it follows the head through
    /// later links and deletions. Used when the last element of a branch
    /// becomes, or stops being, an end of the flow.
    #[instrument(skip(self))]
    pub fn set_branch_terminal(
        &mut self,
        parent: &ElementId,
        index: ChildIndex,
        is_terminal: bool,
    ) -> Result<()> {
        let head = self
            .element(parent)?
            .slot(index)?
            .cloned()
            .ok_or_else(|| FlowError::EmptySlot {
                parent: parent.clone(),
                index,
            })?;

        self.element_mut(&head)?.is_terminal = is_terminal;
        debug!(%head, "updated terminal flag");
        self.finish_mutation()
    }

    fn check_insertable(&self, element: &Element) -> Result<()> {
        if self.contains(element.id()) {
            return Err(FlowError::DuplicateElement(element.id().clone()));
        }
        let owns_heads =
            element.fault().is_some() || element.children().iter().any(Option::is_some);
        if element.has_head_linkage() || owns_heads {
            return Err(FlowError::AlreadyLinked(element.id().clone()));
        }
        Ok(())
    }
}
