//! Deferred removals requested by systems.
//!
//! A system cannot call back into the `State` that is currently driving it,
//! so it records the entities it wants gone on a [`Commands`] handle. The
//! state drains the queue after each admission or removal pass and removes
//! every queued entity from all systems.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::entity::{Entity, EntityRef};

/// Cloneable handle onto a state's pending-removal queue.
#[derive(Clone, Default)]
pub struct Commands {
    queue: Arc<Mutex<VecDeque<EntityRef>>>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that `entity` be removed from every system of the state.
    /// Requests are applied in the order they are made.
    pub fn remove(&self, entity: EntityRef) {
        self.queue.lock().push_back(entity);
    }

    pub(crate) fn pop(&self) -> Option<EntityRef> {
        self.queue.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Whether both handles feed the same queue.
    pub fn same_queue(&self, other: &Commands) -> bool {
        Arc::ptr_eq(&self.queue, &other.queue)
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.lock();
        f.debug_list().entries(queue.iter().map(|e| e.id())).finish()
    }
}
