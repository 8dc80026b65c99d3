//! Subtree Expander
//!
//! Collects the elements inside a branching element's branches. Selecting
//! expands into everything reachable; deselecting only follows elements that
//! are still selected.

use crate::error::{FlowError, Result};
use crate::graph::{Element, ElementId, FlowStore};

/// Which way a selection gesture goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    Select,
    Deselect,
}

impl SelectionAction {
    fn continues_through(self, element: &Element) -> bool {
        match self {
            Self::Select => true,
            Self::Deselect => element.is_selected(),
        }
    }
}

impl FlowStore {
    /// Collect the elements nested in `element`'s branches, recursing into
    /// nested branching elements.
    ///
    /// Each branch is walked from its head for as long as `action` allows.
    /// Non-branching elements have an empty subtree.
    pub fn subtree_elements(
        &self,
        action: SelectionAction,
        element: &Element,
    ) -> Result<Vec<ElementId>> {
        let mut subtree = Vec::new();
        self.collect_subtree(action, element, &mut subtree)?;
        Ok(subtree)
    }

    fn collect_subtree(
        &self,
        action: SelectionAction,
        element: &Element,
        subtree: &mut Vec<ElementId>,
    ) -> Result<()> {
        for head in element.children().iter().flatten() {
            let mut current = Some(head);
            while let Some(id) = current {
                if subtree.len() > self.len() {
                    return Err(FlowError::Cycle(element.id().clone()));
                }
                let member = self.element(id)?;
                if !action.continues_through(member) {
                    break;
                }
                subtree.push(id.clone());
                if member.is_branching() {
                    self.collect_subtree(action, member, subtree)?;
                }
                current = member.next();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ChildIndex;

    fn id(raw: &str) -> ElementId {
        ElementId::from(raw)
    }

    /// decision: branch 0 = a0 -> loop(2) -> a2, loop branch 0 = l0;
    /// branch 1 = b0.
    fn nested() -> FlowStore {
        let mut store = FlowStore::new();
        store
            .add_root(Element::branching("decision", 2).unwrap())
            .unwrap();
        store
            .link_branch_or_fault(&id("decision"), ChildIndex::Branch(0), Some(Element::step("a0")))
            .unwrap();
        store
            .link_element(Element::branching("loop", 2).unwrap().with_prev("a0"))
            .unwrap();
        store
            .link_element(Element::step("a2").with_prev("loop"))
            .unwrap();
        store
            .link_branch_or_fault(&id("loop"), ChildIndex::Branch(0), Some(Element::step("l0")))
            .unwrap();
        store
            .link_branch_or_fault(&id("decision"), ChildIndex::Branch(1), Some(Element::step("b0")))
            .unwrap();
        store
    }

    #[test]
    fn selecting_expands_everything() {
        let store = nested();
        let decision = store.element(&id("decision")).unwrap();
        assert_eq!(
            store
                .subtree_elements(SelectionAction::Select, decision)
                .unwrap(),
            vec![id("a0"), id("loop"), id("l0"), id("a2"), id("b0")]
        );
    }

    #[test]
    fn deselecting_stops_at_unselected_elements() {
        let mut store = nested();
        for raw in ["a0", "loop", "b0"] {
            store.set_selected(&id(raw), true).unwrap();
        }

        let decision = store.element(&id("decision")).unwrap();
        assert_eq!(
            store
                .subtree_elements(SelectionAction::Deselect, decision)
                .unwrap(),
            vec![id("a0"), id("loop"), id("b0")]
        );
    }

    #[test]
    fn plain_elements_have_empty_subtrees() {
        let store = nested();
        let leaf = store.element(&id("b0")).unwrap();
        assert!(store
            .subtree_elements(SelectionAction::Select, leaf)
            .unwrap()
            .is_empty());
    }
}
