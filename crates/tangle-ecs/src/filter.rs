use std::any::TypeId;

use tangle_core::EntityId;

use crate::entity::{Capability, Entity, Name};

/// A predicate over entities.
pub trait Filter: Send + Sync {
    /// Returns true if the entity passes the filter.
    fn satisfies(&self, entity: &dyn Entity) -> bool;
}

/// Blanket implementation so closures can be used as filters.
impl<F: Fn(&dyn Entity) -> bool + Send + Sync> Filter for F {
    fn satisfies(&self, entity: &dyn Entity) -> bool {
        (self)(entity)
    }
}

/// Matches the entity with a specific id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdFilter {
    id: EntityId,
}

impl IdFilter {
    pub fn new(id: EntityId) -> Self {
        Self { id }
    }

    /// Filter for an entity that already has an id.
    pub fn of(entity: &dyn Entity) -> Self {
        Self::new(entity.id())
    }
}

impl Filter for IdFilter {
    fn satisfies(&self, entity: &dyn Entity) -> bool {
        self.id == entity.id()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TypeMatch {
    Concrete { type_id: TypeId, name: &'static str },
    Capability(Capability),
}

/// Matches entities by concrete type, or by a capability they provide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeFilter {
    target: TypeMatch,
}

impl TypeFilter {
    /// Matches entities whose concrete type is exactly `T`.
    pub fn of<T: Entity>() -> Self {
        Self {
            target: TypeMatch::Concrete {
                type_id: TypeId::of::<T>(),
                name: std::any::type_name::<T>(),
            },
        }
    }

    /// Matches any entity implementing the capability.
    pub fn capability(capability: Capability) -> Self {
        Self {
            target: TypeMatch::Capability(capability),
        }
    }

    /// Shorthand for `TypeFilter::capability(Capability::of::<T>())`.
    pub fn implementing<T: ?Sized + 'static>() -> Self {
        Self::capability(Capability::of::<T>())
    }

    pub fn type_name(&self) -> &'static str {
        match self.target {
            TypeMatch::Concrete { name, .. } => name,
            TypeMatch::Capability(capability) => capability.name(),
        }
    }
}

impl Filter for TypeFilter {
    fn satisfies(&self, entity: &dyn Entity) -> bool {
        match self.target {
            TypeMatch::Concrete { type_id, .. } => entity.as_any().type_id() == type_id,
            TypeMatch::Capability(capability) => entity.implements(capability),
        }
    }
}

/// Matches entities with a given name. Unnamed entities never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    name: Name,
}

impl NameFilter {
    pub fn new(name: impl Into<Name>) -> Self {
        Self { name: name.into() }
    }
}

impl Filter for NameFilter {
    fn satisfies(&self, entity: &dyn Entity) -> bool {
        entity.name().is_some_and(|name| *name == self.name)
    }
}

/// Conjunction of filters. All must pass; an empty list matches everything.
#[derive(Default)]
pub struct AllOf {
    filters: Vec<Box<dyn Filter>>,
}

impl AllOf {
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self { filters }
    }

    /// Builder-style append.
    pub fn and(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for AllOf {
    fn satisfies(&self, entity: &dyn Entity) -> bool {
        self.filters.iter().all(|f| f.satisfies(entity))
    }
}
