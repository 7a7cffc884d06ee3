//! Entity identity: process-wide monotonic ids and the `Id` component.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Last id handed out. The first call to [`EntityId::next`] yields `1`.
static ID_SOURCE: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for entities in the ECS. `0` means unassigned.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The reserved "unassigned" id.
    pub const UNASSIGNED: EntityId = EntityId(0);

    /// Issue a fresh id, unique for the lifetime of the process.
    pub fn next() -> Self {
        Self(ID_SOURCE.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Raw counter value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Whether this id has not been assigned yet.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// The base component every entity carries.
///
/// Entities are shared behind `Arc`, so the id lives in an atomic cell and is
/// written at most once, on the first admission attempt.
#[derive(Default)]
pub struct Id(AtomicU64);

impl Id {
    /// An unassigned id, filled in when the entity is first added to a state.
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// An id that is assigned immediately.
    pub fn fresh() -> Self {
        Self(AtomicU64::new(EntityId::next().0))
    }

    /// Current id, possibly [`EntityId::UNASSIGNED`].
    pub fn get(&self) -> EntityId {
        EntityId(self.0.load(Ordering::Acquire))
    }

    pub fn is_zero(&self) -> bool {
        self.get().is_zero()
    }

    /// Assign a fresh id if none is set yet. Returns the id in effect afterwards.
    pub fn assign(&self) -> EntityId {
        let current = self.get();
        if !current.is_zero() {
            return current;
        }
        let fresh = EntityId::next();
        match self
            .0
            .compare_exchange(0, fresh.0, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => fresh,
            Err(existing) => EntityId(existing),
        }
    }
}

impl From<EntityId> for Id {
    fn from(id: EntityId) -> Self {
        Self(AtomicU64::new(id.0))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.get().0)
    }
}
