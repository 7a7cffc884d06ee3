use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use tangle_core::{EntityId, Id};

use crate::depends::Depends;

/// Shared handle to an entity. The same handle is given to every system.
pub type EntityRef = Arc<dyn Entity>;

/// An identity-bearing object that systems can admit and remove.
///
/// Only [`Entity::identity`] and [`Entity::as_any`] are required. Everything
/// else is an optional capability with a default that reports "absent".
///
/// ```ignore
/// struct Turret {
///     id: Id,
///     depends: Depends,
/// }
///
/// impl Entity for Turret {
///     fn identity(&self) -> &Id { &self.id }
///     fn as_any(&self) -> &dyn Any { self }
///     fn depends(&self) -> Option<&Depends> { Some(&self.depends) }
/// }
/// ```
pub trait Entity: Any + Send + Sync {
    /// The `Id` component of this entity.
    fn identity(&self) -> &Id;

    /// The concrete entity, for type filters and downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Name component, if the entity has one.
    fn name(&self) -> Option<&Name> {
        None
    }

    /// Dependency declaration, if the entity has one.
    fn depends(&self) -> Option<&Depends> {
        None
    }

    /// User-defined capabilities beyond the built-in `Name` and `Depends`.
    fn provides(&self, _capability: Capability) -> bool {
        false
    }

    fn id(&self) -> EntityId {
        self.identity().get()
    }

    /// Two entities are equal when their ids are.
    fn equals(&self, other: &dyn Entity) -> bool {
        self.id() == other.id()
    }

    /// Whether the entity has not been given an id yet.
    fn is_unassigned(&self) -> bool {
        self.identity().is_zero()
    }

    /// Capability check covering both built-in and user-defined capabilities.
    /// Override [`Entity::provides`] instead of this.
    fn implements(&self, capability: Capability) -> bool {
        if capability == Capability::of::<Name>() {
            return self.name().is_some();
        }
        if capability == Capability::of::<Depends>() {
            return self.depends().is_some();
        }
        self.provides(capability)
    }
}

impl dyn Entity {
    /// Whether the concrete type of this entity is `T`.
    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().type_id() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for dyn Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Entity({}, {:?})", self.id(), name.as_str()),
            None => write!(f, "Entity({})", self.id()),
        }
    }
}

/// Identifies a capability by a marker type.
///
/// Any `'static` type can act as a marker, including trait objects:
/// `Capability::of::<dyn Renderable>()`.
#[derive(Clone, Copy)]
pub struct Capability {
    type_id: TypeId,
    type_name: &'static str,
}

impl Capability {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Capability {}

impl std::hash::Hash for Capability {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({})", self.type_name)
    }
}

/// Entity component describing its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
