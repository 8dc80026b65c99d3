//! Chain Walker
//!
//! Walks along one chain to find its boundaries. Chain walks never cross into
//! a parent or a branch; they only follow `prev` or `next`. The root walk is
//! the exception: it climbs out of branches through `parent`.

use crate::error::{FlowError, Result};
use crate::graph::{Element, ElementId, FlowStore};

#[derive(Debug, Clone, Copy)]
enum Direction {
    Backward,
    Forward,
}

impl FlowStore {
    /// Follow `prev` links from `id` to the first element of its chain.
    pub fn find_first_element(&self, id: &ElementId) -> Result<&Element> {
        self.walk_to_end(id, Direction::Backward)
    }

    /// Follow `next` links from `id` to the last element of its chain.
    pub fn find_last_element(&self, id: &ElementId) -> Result<&Element> {
        self.walk_to_end(id, Direction::Forward)
    }

    /// Find the root of the flow `id` belongs to, climbing from each chain's
    /// head to its parent.
    pub fn find_root(&self, id: &ElementId) -> Result<&Element> {
        let mut current = self.element(id)?;
        for _ in 0..=self.len() {
            match current.prev().or(current.parent()) {
                Some(up) => current = self.element(up)?,
                None => return Ok(current),
            }
        }
        Err(FlowError::Cycle(id.clone()))
    }

    /// Collect the chain that starts at `head`, following `next` links.
    pub fn chain_ids(&self, head: &ElementId) -> Result<Vec<ElementId>> {
        let mut ids = Vec::new();
        let mut current = Some(head);
        while let Some(id) = current {
            if ids.len() > self.len() {
                return Err(FlowError::Cycle(head.clone()));
            }
            let element = self.element(id)?;
            ids.push(id.clone());
            current = element.next();
        }
        Ok(ids)
    }

    /// Every walk visits at most `len()` distinct elements; one more step
    /// means the links loop.
    fn walk_to_end(&self, id: &ElementId, direction: Direction) -> Result<&Element> {
        let mut current = self.element(id)?;
        for _ in 0..=self.len() {
            let step = match direction {
                Direction::Backward => current.prev(),
                Direction::Forward => current.next(),
            };
            match step {
                Some(step) => current = self.element(step)?,
                None => return Ok(current),
            }
        }
        Err(FlowError::Cycle(id.clone()))
    }
}
