//! Descendant Enumeration
//!
//! Deletion needs to know everything nested under an element so it can purge
//! it together with the element. What counts as "nested" depends on the
//! element kind, so the store asks a caller-supplied strategy rather than
//! deciding itself.

use crate::graph::{Element, ElementId, FlowStore};

/// Enumerates every identifier nested underneath an element.
///
/// The store treats the answer as authoritative and removes exactly what is
/// returned, so an implementation must cover every branch body and fault
/// chain under `element`. The element itself must not be included.
pub trait DescendantEnumerator {
    fn descendants_of(&self, store: &FlowStore, element: &Element) -> Vec<ElementId>;
}

impl<F> DescendantEnumerator for F
where
    F: Fn(&FlowStore, &Element) -> Vec<ElementId>,
{
    fn descendants_of(&self, store: &FlowStore, element: &Element) -> Vec<ElementId> {
        self(store, element)
    }
}

/// Enumerates all branch chains and the fault chain, recursively.
///
/// Works from the structural fields alone, which is what most element kinds
/// need.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedDescendants;

impl DescendantEnumerator for NestedDescendants {
    fn descendants_of(&self, store: &FlowStore, element: &Element) -> Vec<ElementId> {
        let mut nested = Vec::new();
        collect_nested(store, element, &mut nested);
        nested
    }
}

fn collect_nested(store: &FlowStore, element: &Element, nested: &mut Vec<ElementId>) {
    for head in element.children().iter().flatten().chain(element.fault()) {
        let mut current = Some(head);
        while let Some(id) = current {
            // Bounded by the store size in case the links loop.
            if nested.len() > store.len() {
                return;
            }
            let Some(member) = store.get(id) else {
                break;
            };
            nested.push(id.clone());
            collect_nested(store, member, nested);
            current = member.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ChildIndex;

    fn id(raw: &str) -> ElementId {
        ElementId::from(raw)
    }

    #[test]
    fn nested_covers_branches_faults_and_nesting() {
        let mut store = FlowStore::new();
        store
            .add_root(Element::branching("outer", 2).unwrap().with_fault_support())
            .unwrap();
        store
            .link_branch_or_fault(
                &id("outer"),
                ChildIndex::Branch(0),
                Some(Element::branching("inner", 2).unwrap()),
            )
            .unwrap();
        store
            .link_branch_or_fault(&id("inner"), ChildIndex::Branch(1), Some(Element::step("deep")))
            .unwrap();
        store
            .link_element(Element::step("after-inner").with_prev("inner"))
            .unwrap();
        store
            .link_branch_or_fault(&id("outer"), ChildIndex::Fault, Some(Element::step("fault")))
            .unwrap();

        let outer = store.element(&id("outer")).unwrap();
        let nested = NestedDescendants.descendants_of(&store, outer);
        assert_eq!(
            nested,
            vec![id("inner"), id("deep"), id("after-inner"), id("fault")]
        );
    }

    #[test]
    fn plain_elements_have_no_descendants() {
        let mut store = FlowStore::new();
        store.add_root(Element::step("only")).unwrap();
        let only = store.element(&id("only")).unwrap();
        assert!(NestedDescendants.descendants_of(&store, only).is_empty());
    }

    #[test]
    fn closures_are_enumerators() {
        let mut store = FlowStore::new();
        store.add_root(Element::step("only")).unwrap();
        let only = store.element(&id("only")).unwrap();

        let fixed = |_: &FlowStore, _: &Element| vec![ElementId::from("x")];
        assert_eq!(fixed.descendants_of(&store, only), vec![id("x")]);
    }
}
