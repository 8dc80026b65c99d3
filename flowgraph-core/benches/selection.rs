use criterion::{black_box, criterion_group, criterion_main, Criterion};

use flowgraph_core::edit::NestedDescendants;
use flowgraph_core::{ChildIndex, Element, ElementId, FlowStore, StoreConfig};

/// A chain of `len` elements where every tenth one is a two-way decision
/// with a short step in each branch.
fn long_flow(len: usize) -> (FlowStore, Vec<ElementId>) {
    let mut store = FlowStore::with_config(StoreConfig {
        check_invariants: false,
        initial_capacity: len * 2,
    });
    let mut chain = vec![ElementId::from("start")];
    store.add_root(Element::step("start")).unwrap();

    for i in 1..len {
        let prev = chain[i - 1].clone();
        let id = ElementId::from(format!("e{i}"));
        let element = if i % 10 == 0 {
            Element::branching(id.clone(), 2).unwrap()
        } else {
            Element::step(id.clone())
        };
        store.link_element(element.with_prev(prev)).unwrap();
        if i % 10 == 0 {
            for slot in 0..2 {
                let head = Element::step(format!("e{i}-b{slot}"));
                store
                    .link_branch_or_fault(&id, ChildIndex::Branch(slot), Some(head))
                    .unwrap();
            }
        }
        chain.push(id);
    }
    (store, chain)
}

fn bench_selection(c: &mut Criterion) {
    let (mut store, chain) = long_flow(2_000);
    let top = chain[1].clone();
    let update = store.resolve_selection(&top, None).unwrap();
    store.apply_selection(&update).unwrap();
    let last = chain[chain.len() - 1].clone();

    c.bench_function("select_range_2000", |b| {
        b.iter(|| {
            store
                .resolve_selection(black_box(&last), Some(black_box(&top)))
                .unwrap()
        })
    });

    c.bench_function("select_above_2000", |b| {
        let (mut store, chain) = long_flow(2_000);
        let bottom = chain[chain.len() - 1].clone();
        let update = store.resolve_selection(&bottom, None).unwrap();
        store.apply_selection(&update).unwrap();
        b.iter(|| {
            store
                .resolve_selection(black_box(&chain[1]), Some(black_box(&bottom)))
                .unwrap()
        })
    });
}

fn bench_delete(c: &mut Criterion) {
    c.bench_function("delete_decision_mid_chain", |b| {
        b.iter_batched(
            || long_flow(500).0,
            |mut store| {
                store
                    .delete_element(&ElementId::from("e250"), None, &NestedDescendants)
                    .unwrap()
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_selection, bench_delete);
criterion_main!(benches);
