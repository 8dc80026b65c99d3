use proptest::prelude::*;

use flowgraph_core::edit::NestedDescendants;
use flowgraph_core::{ChildIndex, Element, ElementId, FlowStore, StoreConfig};

/// One canvas gesture. Positions are taken modulo the number of elements
/// present when the gesture is applied.
#[derive(Debug, Clone)]
enum Gesture {
    Append { at: usize, branching: bool, fault: bool },
    LinkHead { at: usize, slot: usize, fault: bool },
    Delete { at: usize, hint: Option<usize> },
    DeleteFault { at: usize },
    MarkTerminal { at: usize, slot: usize, terminal: bool },
}

fn arb_gesture() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        3 => (any::<usize>(), any::<bool>(), any::<bool>())
            .prop_map(|(at, branching, fault)| Gesture::Append { at, branching, fault }),
        3 => (any::<usize>(), 0..3usize, any::<bool>())
            .prop_map(|(at, slot, fault)| Gesture::LinkHead { at, slot, fault }),
        2 => (any::<usize>(), proptest::option::of(0..3usize))
            .prop_map(|(at, hint)| Gesture::Delete { at, hint }),
        1 => any::<usize>().prop_map(|at| Gesture::DeleteFault { at }),
        1 => (any::<usize>(), 0..3usize, any::<bool>())
            .prop_map(|(at, slot, terminal)| Gesture::MarkTerminal { at, slot, terminal }),
    ]
}

fn pick(store: &FlowStore, at: usize) -> Option<ElementId> {
    let len = store.len();
    if len == 0 {
        return None;
    }
    store.ids().nth(at % len).cloned()
}

fn fresh(counter: &mut usize, branching: bool, fault: bool) -> Element {
    *counter += 1;
    let id = format!("n{counter}");
    let element = if branching {
        Element::branching(id, 2).expect("arity 2 is valid")
    } else {
        Element::step(id)
    };
    if fault {
        element.with_fault_support()
    } else {
        element
    }
}

fn apply(store: &mut FlowStore, gesture: &Gesture, counter: &mut usize) -> flowgraph_core::Result<()> {
    match *gesture {
        Gesture::Append { at, branching, fault } => {
            let Some(prev) = pick(store, at) else { return Ok(()) };
            let next = store.element(&prev)?.next().cloned();
            let mut element = fresh(counter, branching, fault).with_prev(prev);
            if let Some(next) = next {
                element = element.with_next(next);
            }
            store.link_element(element)
        }
        Gesture::LinkHead { at, slot, fault } => {
            let Some(parent) = pick(store, at) else { return Ok(()) };
            let index = if fault { ChildIndex::Fault } else { ChildIndex::Branch(slot) };
            store.link_branch_or_fault(&parent, index, Some(fresh(counter, false, true)))
        }
        Gesture::Delete { at, hint } => {
            let Some(target) = pick(store, at) else { return Ok(()) };
            store
                .delete_element(&target, hint, &NestedDescendants)
                .map(|_| ())
        }
        Gesture::DeleteFault { at } => {
            let Some(owner) = pick(store, at) else { return Ok(()) };
            store.delete_fault(&owner, &NestedDescendants).map(|_| ())
        }
        Gesture::MarkTerminal { at, slot, terminal } => {
            let Some(parent) = pick(store, at) else { return Ok(()) };
            store.set_branch_terminal(&parent, ChildIndex::Branch(slot), terminal)
        }
    }
}

fn seeded_store() -> FlowStore {
    let mut store = FlowStore::with_config(StoreConfig {
        check_invariants: false,
        ..StoreConfig::default()
    });
    store
        .add_root(Element::step("start").with_fault_support())
        .expect("empty store accepts a root");
    store
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    /// Every gesture either succeeds with a valid store or fails without
    /// touching it.
    #[test]
    fn gestures_preserve_invariants(gestures in proptest::collection::vec(arb_gesture(), 1..40)) {
        let mut store = seeded_store();
        let mut counter = 0;

        for gesture in &gestures {
            let before: Vec<Element> = store.iter().cloned().collect();
            let outcome = apply(&mut store, gesture, &mut counter);

            prop_assert_eq!(store.validate(), Ok(()), "after {:?}", gesture);
            if outcome.is_err() {
                let after: Vec<Element> = store.iter().cloned().collect();
                prop_assert_eq!(before, after, "failed {:?} mutated the store", gesture);
            }
        }
    }

    /// Deleted identifiers are gone and nothing still points at them.
    #[test]
    fn deletion_leaves_no_references(
        gestures in proptest::collection::vec(arb_gesture(), 1..30),
        at in any::<usize>(),
    ) {
        let mut store = seeded_store();
        let mut counter = 0;
        for gesture in &gestures {
            let _ = apply(&mut store, gesture, &mut counter);
        }

        if let Some(target) = pick(&store, at) {
            let report = store
                .delete_element(&target, None, &NestedDescendants)
                .expect("present element deletes cleanly");

            prop_assert!(report.removed.contains(&target));
            for removed in &report.removed {
                prop_assert!(!store.contains(removed));
            }
            prop_assert_eq!(store.validate(), Ok(()));
        }
    }

    /// Selection never reports identifiers that are not in the store.
    #[test]
    fn selection_stays_inside_store(
        gestures in proptest::collection::vec(arb_gesture(), 1..30),
        at in any::<usize>(),
    ) {
        let mut store = seeded_store();
        let mut counter = 0;
        for gesture in &gestures {
            let _ = apply(&mut store, gesture, &mut counter);
        }

        if let Some(clicked) = pick(&store, at) {
            let update = store
                .resolve_selection(&clicked, None)
                .expect("fresh selection resolves");
            prop_assert_eq!(update.top_selected.as_ref(), Some(&clicked));
            for id in update.to_select.iter().chain(&update.selectable) {
                prop_assert!(store.contains(id));
            }
        }
    }
}
