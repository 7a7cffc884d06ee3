//! Entities and systems shared by the unit tests.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tangle_core::{EntityId, Id};

use crate::depends::Depends;
use crate::entity::{Entity, EntityRef, Name};
use crate::error::{EcsError, Result};
use crate::filter::Filter;
use crate::system::System;

/// General-purpose test entity with optional name and dependencies.
pub struct Thing {
    pub id: Id,
    pub name: Option<Name>,
    pub depends: Option<Depends>,
}

impl Thing {
    pub fn plain() -> Arc<Self> {
        Arc::new(Self {
            id: Id::new(),
            name: None,
            depends: None,
        })
    }

    pub fn named(name: &str) -> Arc<Self> {
        Arc::new(Self {
            id: Id::new(),
            name: Some(Name::new(name)),
            depends: None,
        })
    }

    pub fn depending(filters: Vec<Box<dyn Filter>>) -> Arc<Self> {
        Arc::new(Self {
            id: Id::new(),
            name: None,
            depends: Some(Depends::new(filters)),
        })
    }
}

impl Entity for Thing {
    fn identity(&self) -> &Id {
        &self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    fn depends(&self) -> Option<&Depends> {
        self.depends.as_ref()
    }
}

/// A second concrete entity type, for type filters.
pub struct Other {
    pub id: Id,
}

impl Other {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { id: Id::new() })
    }
}

impl Entity for Other {
    fn identity(&self) -> &Id {
        &self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared event log written by [`Recorder`] systems.
pub type Log = Arc<Mutex<Vec<String>>>;

/// Tracks which entities it knows about and logs every call.
pub struct Recorder {
    pub label: &'static str,
    pub priority: i32,
    pub known: HashSet<EntityId>,
    pub reject: bool,
    pub log: Log,
}

impl Recorder {
    pub fn new(label: &'static str, priority: i32, log: &Log) -> Self {
        Self {
            label,
            priority,
            known: HashSet::new(),
            reject: false,
            log: log.clone(),
        }
    }

    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0} refused the entity")]
pub struct Refused(pub &'static str);

impl System for Recorder {
    fn add(&mut self, entity: &EntityRef) -> Result<()> {
        self.log.lock().push(format!("{}.add", self.label));
        if self.reject {
            return Err(EcsError::rejected(self.label, Refused(self.label)));
        }
        self.known.insert(entity.id());
        Ok(())
    }

    fn remove(&mut self, entity: &EntityRef) {
        self.log.lock().push(format!("{}.remove", self.label));
        self.known.remove(&entity.id());
    }

    fn update(&mut self, _tick: &dyn Any) {
        self.log.lock().push(format!("{}.update", self.label));
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}
