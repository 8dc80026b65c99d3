//! Selection Range Resolver
//!
//! The canvas selects contiguous runs of elements. A click extends or shrinks
//! the current run; this module works out which elements change state and
//! which elements may still be clicked afterwards.
//!
//! # Direction
//!
//! There is no global ordinal to compare positions with. Whether a clicked
//! element lies above or below the run is decided by walking upward from it:
//! reaching a selected element means it is below the run, reaching the root
//! of the flow means it is above. The walk is linear in the distance to the
//! root and assumes the links are acyclic (walks bail out with
//! [`FlowError::Cycle`] otherwise).

use std::collections::HashSet;

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, instrument};

use super::subtree::SelectionAction;
use crate::error::{FlowError, Result};
use crate::graph::{Element, ElementId, FlowStore};

/// Outcome of a selection or deselection gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionUpdate {
    /// Elements that become selected, in visit order.
    pub to_select: Vec<ElementId>,

    /// Elements that become deselected, in visit order.
    pub to_deselect: Vec<ElementId>,

    /// Elements that may be clicked next. Empty means no restriction.
    pub selectable: Vec<ElementId>,

    /// Topmost element of the run after the gesture.
    pub top_selected: Option<ElementId>,
}

/// Caps a walk at one visit per stored element.
struct StepBudget<'a> {
    remaining: usize,
    origin: &'a ElementId,
}

impl<'a> StepBudget<'a> {
    fn new(store: &FlowStore, origin: &'a ElementId) -> Self {
        Self {
            remaining: store.len() + 1,
            origin,
        }
    }

    fn tick(&mut self) -> Result<()> {
        self.remaining = self
            .remaining
            .checked_sub(1)
            .ok_or_else(|| FlowError::Cycle(self.origin.clone()))?;
        Ok(())
    }
}

impl FlowStore {
    /// Resolve a click that adds `just_selected` to the selection.
    #[instrument(skip(self))]
    pub fn resolve_selection(
        &self,
        just_selected: &ElementId,
        top_selected: Option<&ElementId>,
    ) -> Result<SelectionUpdate> {
        let clicked = self.element(just_selected)?;
        let mut to_select = IndexSet::new();

        let top = match top_selected {
            None => {
                self.gather(SelectionAction::Select, clicked, &mut to_select)?;
                clicked.id().clone()
            }
            Some(top) => {
                self.element(top)?;
                if self.probe_upward(clicked, &mut to_select)? {
                    top.clone()
                } else {
                    // Above the run: select from the click down to it.
                    to_select.clear();
                    let anchor = self.lift_onto_chain_of(clicked, top)?;
                    self.gather_down_to(anchor, top, &mut to_select)?;
                    anchor.id().clone()
                }
            }
        };

        let selectable = self.selectable_elements(Some(&top))?;
        debug!(selected = to_select.len(), top = %top, "resolved selection");
        Ok(SelectionUpdate {
            to_select: to_select.into_iter().collect(),
            to_deselect: Vec::new(),
            selectable,
            top_selected: Some(top),
        })
    }

    /// Resolve a click that removes `just_deselected` from the selection.
    #[instrument(skip(self))]
    pub fn resolve_deselection(
        &self,
        just_deselected: &ElementId,
        top_selected: Option<&ElementId>,
    ) -> Result<SelectionUpdate> {
        let deselected = self.element(just_deselected)?;
        let mut to_deselect = IndexSet::new();

        let top = if top_selected == Some(just_deselected) {
            self.gather(SelectionAction::Deselect, deselected, &mut to_deselect)?;
            match deselected.next() {
                Some(next) if self.element(next)?.is_selected() => Some(next.clone()),
                _ => None,
            }
        } else {
            let mut budget = StepBudget::new(self, just_deselected);
            let mut current = Some(deselected);
            while let Some(element) = current.filter(|e| e.is_selected()) {
                budget.tick()?;
                self.gather(SelectionAction::Deselect, element, &mut to_deselect)?;
                current = self.next_of(element)?;
            }
            top_selected.cloned()
        };

        let selectable = self.selectable_elements(top.as_ref())?;
        debug!(deselected = to_deselect.len(), top = ?top, "resolved deselection");
        Ok(SelectionUpdate {
            to_select: Vec::new(),
            to_deselect: to_deselect.into_iter().collect(),
            selectable,
            top_selected: top,
        })
    }

    /// Elements a click may target while `top_selected` heads the run.
    ///
    /// Covers the top's chain from just below the flow root to its end,
    /// with the full subtree of every branching element at or below the top.
    /// No top means no restriction, reported as an empty list.
    pub fn selectable_elements(&self, top_selected: Option<&ElementId>) -> Result<Vec<ElementId>> {
        let Some(top) = top_selected else {
            return Ok(Vec::new());
        };
        let top_element = self.element(top)?;
        let mut selectable = IndexSet::new();
        let mut budget = StepBudget::new(self, top);

        let mut current = top_element.prev();
        while let Some(id) = current {
            budget.tick()?;
            let element = self.element(id)?;
            if element.is_root() {
                break;
            }
            selectable.insert(id.clone());
            current = element.prev();
        }

        let mut budget = StepBudget::new(self, top);
        let mut current = Some(top_element);
        while let Some(element) = current {
            budget.tick()?;
            self.gather(SelectionAction::Select, element, &mut selectable)?;
            current = self.next_of(element)?;
        }

        Ok(selectable.into_iter().collect())
    }

    /// Write the selection flags an update describes.
    #[instrument(skip(self, update))]
    pub fn apply_selection(&mut self, update: &SelectionUpdate) -> Result<()> {
        for id in update.to_deselect.iter().chain(&update.to_select) {
            self.element(id)?;
        }
        for id in &update.to_deselect {
            self.set_selected(id, false)?;
        }
        for id in &update.to_select {
            self.set_selected(id, true)?;
        }
        debug!(
            selected = update.to_select.len(),
            deselected = update.to_deselect.len(),
            "applied selection"
        );
        self.finish_mutation()
    }

    /// Iterate over the currently selected elements.
    pub fn selected_ids(&self) -> impl Iterator<Item = &ElementId> {
        self.iter()
            .filter(|element| element.is_selected())
            .map(Element::id)
    }

    /// Walk up from `clicked` through `prev`, and through `parent` at branch
    /// heads, gathering every unselected element. Returns whether a selected
    /// element was reached before the flow root.
    fn probe_upward(&self, clicked: &Element, gathered: &mut IndexSet<ElementId>) -> Result<bool> {
        let mut budget = StepBudget::new(self, clicked.id());
        let mut current = Some(clicked);
        while let Some(element) = current {
            budget.tick()?;
            if element.is_selected() {
                return Ok(true);
            }
            self.gather(SelectionAction::Select, element, gathered)?;
            current = match (element.prev(), element.parent()) {
                (Some(up), _) | (None, Some(up)) => Some(self.element(up)?),
                (None, None) => None,
            };
        }
        Ok(false)
    }

    /// The element on `top`'s chain that contains `clicked`: `clicked` itself
    /// or the branching element it is nested under.
    fn lift_onto_chain_of<'s>(&'s self, clicked: &'s Element, top: &ElementId) -> Result<&'s Element> {
        let first = self.find_first_element(top)?.id().clone();
        let chain: HashSet<ElementId> = self.chain_ids(&first)?.into_iter().collect();

        let mut budget = StepBudget::new(self, clicked.id());
        let mut current = clicked;
        loop {
            budget.tick()?;
            if chain.contains(current.id()) {
                return Ok(current);
            }
            match self.find_first_element(current.id())?.parent() {
                Some(parent) => current = self.element(parent)?,
                None => {
                    return Err(FlowError::OutsideSelectableRange {
                        element: clicked.id().clone(),
                        top: top.clone(),
                    })
                }
            }
        }
    }

    /// Gather from `anchor` down to, but not including, `top`.
    fn gather_down_to(
        &self,
        anchor: &Element,
        top: &ElementId,
        gathered: &mut IndexSet<ElementId>,
    ) -> Result<()> {
        let mut budget = StepBudget::new(self, anchor.id());
        let mut current = Some(anchor);
        while let Some(element) = current {
            budget.tick()?;
            if element.id() == top {
                return Ok(());
            }
            self.gather(SelectionAction::Select, element, gathered)?;
            current = self.next_of(element)?;
        }
        Err(FlowError::OutsideSelectableRange {
            element: anchor.id().clone(),
            top: top.clone(),
        })
    }

    /// Add `element` and, when it branches, its subtree.
    fn gather(
        &self,
        action: SelectionAction,
        element: &Element,
        gathered: &mut IndexSet<ElementId>,
    ) -> Result<()> {
        gathered.insert(element.id().clone());
        if element.is_branching() {
            gathered.extend(self.subtree_elements(action, element)?);
        }
        Ok(())
    }

    fn next_of(&self, element: &Element) -> Result<Option<&Element>> {
        element.next().map(|next| self.element(next)).transpose()
    }
}
