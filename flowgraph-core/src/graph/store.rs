//! Element Store
//!
//! The store is the single source of truth for graph shape. Every element of
//! a flow lives here, keyed by its identifier, and every link is just an
//! identifier stored in another element.
//!
//! Linking, walking, deletion and selection are implemented as further
//! `impl FlowStore` blocks in the `edit` and `selection` modules; this file
//! only holds the table itself and the plumbing they share.

use indexmap::IndexMap;
use tracing::{debug, error};

use super::element::{Element, ElementId};
use crate::config::StoreConfig;
use crate::error::{FlowError, Result};

/// The element store: all elements of one flow, indexed by ID.
///
/// Iteration follows insertion order, so renderers and tests see a stable
/// sequence.
#[derive(Debug, Clone, Default)]
pub struct FlowStore {
    /// All elements in the flow, indexed by ID.
    elements: IndexMap<ElementId, Element>,

    config: StoreConfig,
}

impl FlowStore {
    /// Create a new empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a new empty store.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            elements: IndexMap::with_capacity(config.initial_capacity),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Insert a free element as the start of a new flow.
    ///
    /// The element must not carry any linkage yet.
    pub fn add_root(&mut self, element: Element) -> Result<()> {
        if self.contains(element.id()) {
            return Err(FlowError::DuplicateElement(element.id.clone()));
        }
        if element.prev.is_some() || element.next.is_some() || element.has_head_linkage() {
            return Err(FlowError::AlreadyLinked(element.id.clone()));
        }

        debug!(id = %element.id, "adding root element");
        self.insert(element);
        self.finish_mutation()
    }

    /// Get an element, if present.
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Get an element that the caller guarantees is present.
    pub fn element(&self, id: &ElementId) -> Result<&Element> {
        self.elements
            .get(id)
            .ok_or_else(|| FlowError::MissingElement(id.clone()))
    }

    pub(crate) fn element_mut(&mut self, id: &ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| FlowError::MissingElement(id.clone()))
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Get the total number of elements in the store.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over all elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Iterate over all element IDs in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &ElementId> {
        self.elements.keys()
    }

    /// Elements that start a flow: no previous element and no parent.
    pub fn roots(&self) -> impl Iterator<Item = &Element> {
        self.iter().filter(|element| element.is_root())
    }

    pub(crate) fn insert(&mut self, element: Element) {
        self.elements.insert(element.id.clone(), element);
    }

    pub(crate) fn remove(&mut self, id: &ElementId) -> Option<Element> {
        self.elements.shift_remove(id)
    }

    pub(crate) fn set_selected(&mut self, id: &ElementId, selected: bool) -> Result<()> {
        self.element_mut(id)?.is_selected = selected;
        Ok(())
    }

    /// Run the configured post-mutation checks.
    pub(crate) fn finish_mutation(&self) -> Result<()> {
        if !self.config.check_invariants {
            return Ok(());
        }
        self.validate().map_err(|violation| {
            error!(%violation, "flow store invariant violated");
            FlowError::from(violation)
        })
    }
}
