//! Shared Store Handle
//!
//! The store itself does no locking: the editor applies one gesture at a
//! time. When the renderer and the gesture handler live on different
//! threads, they share the store through this handle instead. Any number of
//! readers may look at the graph; one writer at a time may edit it.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::graph::FlowStore;

/// A cloneable, lock-guarded handle to a flow store.
#[derive(Debug, Clone, Default)]
pub struct SharedFlowStore {
    inner: Arc<RwLock<FlowStore>>,
}

impl SharedFlowStore {
    pub fn new(store: FlowStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Read-only access for renderers and other consumers.
    pub fn read(&self) -> RwLockReadGuard<'_, FlowStore> {
        self.inner.read()
    }

    /// Run one edit with exclusive access.
    ///
    /// The lock is held for the whole closure, so a gesture that links,
    /// deletes and reselects is seen by readers as a single change.
    pub fn edit<T>(&self, edit: impl FnOnce(&mut FlowStore) -> T) -> T {
        let mut store = self.inner.write();
        edit(&mut *store)
    }
}

impl From<FlowStore> for SharedFlowStore {
    fn from(store: FlowStore) -> Self {
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Element, ElementId};
    use std::thread;

    #[test]
    fn edits_are_visible_to_readers() {
        let shared = SharedFlowStore::default();
        shared
            .edit(|store| store.add_root(Element::step("start")))
            .unwrap();

        assert!(shared.read().contains(&ElementId::from("start")));
    }

    #[test]
    fn handles_cross_threads() {
        let shared = SharedFlowStore::default();
        shared
            .edit(|store| store.add_root(Element::step("start")))
            .unwrap();

        let writer = shared.clone();
        thread::spawn(move || {
            writer
                .edit(|store| store.link_element(Element::step("next").with_prev("start")))
                .unwrap();
        })
        .join()
        .unwrap();

        let store = shared.read();
        assert_eq!(
            store.find_last_element(&ElementId::from("start")).unwrap().id(),
            &ElementId::from("next")
        );
    }
}
