use std::fmt;

use parking_lot::RwLock;

use crate::entity::EntityRef;
use crate::filter::Filter;

/// Entity component describing its dependencies.
///
/// Each filter is a separate requirement slot. `DependsSystem` binds one
/// entity to every slot when the owner is admitted and clears the bindings
/// when it is removed.
pub struct Depends {
    filters: Vec<Box<dyn Filter>>,
    resolved: RwLock<Vec<Option<EntityRef>>>,
}

impl Depends {
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        let slots = filters.len();
        Self {
            filters,
            resolved: RwLock::new(vec![None; slots]),
        }
    }

    /// Builder-style append of another requirement slot.
    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self.resolved.get_mut().push(None);
        self
    }

    pub fn filters(&self) -> &[Box<dyn Filter>] {
        &self.filters
    }

    /// Number of requirement slots.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Snapshot of the bound entity for each slot.
    pub fn resolved(&self) -> Vec<Option<EntityRef>> {
        self.resolved.read().clone()
    }

    /// The entity bound to slot `index`, if any.
    pub fn slot(&self, index: usize) -> Option<EntityRef> {
        self.resolved.read().get(index).cloned().flatten()
    }

    /// Whether every slot is bound.
    pub fn is_resolved(&self) -> bool {
        self.resolved.read().iter().all(Option::is_some)
    }

    pub(crate) fn reset(&self) {
        let mut resolved = self.resolved.write();
        resolved.clear();
        resolved.resize(self.filters.len(), None);
    }

    pub(crate) fn bind(&self, index: usize, entity: EntityRef) {
        self.resolved.write()[index] = Some(entity);
    }

    /// Clears every slot, returning the entities that were bound.
    pub(crate) fn unbind_all(&self) -> Vec<EntityRef> {
        let mut resolved = self.resolved.write();
        let bound = resolved.iter_mut().filter_map(Option::take).collect();
        bound
    }
}

impl fmt::Debug for Depends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Depends")
            .field("slots", &self.filters.len())
            .field("resolved", &*self.resolved.read())
            .finish()
    }
}
