use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tangle_core::{DependsConfig, EntityId};
use tracing::{debug, warn};

use crate::commands::Commands;
use crate::entity::{Entity, EntityRef};
use crate::error::{EcsError, Result};
use crate::system::System;

/// A system for managing dependencies between entities.
///
/// On admission, an entity carrying a [`Depends`](crate::Depends) component
/// has each of its slots bound to a known entity that satisfies the slot's
/// filter. Candidates are scanned in a random order so that broad filters
/// spread their bindings over all matching entities instead of always picking
/// the oldest one.
///
/// When an entity is removed, everything that depends on it is queued for
/// removal through the owning state, which cascades down dependency chains.
pub struct DependsSystem<R = StdRng> {
    priority: i32,
    allow_self_match: bool,
    /// Every admitted entity, in admission order.
    entities: Vec<EntityRef>,
    /// Target id -> entities holding a slot bound to it (one entry per slot).
    dependers: HashMap<EntityId, Vec<EntityRef>>,
    shuffler: R,
    commands: Option<Commands>,
}

impl DependsSystem<StdRng> {
    /// A system with default settings, seeded from the wall clock.
    pub fn new() -> Self {
        Self::from_config(&DependsConfig::default())
    }

    pub fn from_config(config: &DependsConfig) -> Self {
        let seed = config.seed.unwrap_or_else(clock_seed);
        Self::with_rng(StdRng::seed_from_u64(seed))
            .with_priority(config.priority)
            .with_self_match(config.allow_self_match)
    }
}

impl Default for DependsSystem<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

impl<R: Rng + Send + Sync + 'static> DependsSystem<R> {
    /// A system shuffling candidates with the given random source.
    pub fn with_rng(shuffler: R) -> Self {
        Self {
            priority: 0,
            allow_self_match: true,
            entities: Vec::new(),
            dependers: HashMap::new(),
            shuffler,
            commands: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether an entity being admitted may satisfy its own slots.
    pub fn with_self_match(mut self, allow: bool) -> Self {
        self.allow_self_match = allow;
        self
    }

    /// Whether an entity with this id is in the pool.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id() == id)
    }

    /// Number of entities in the pool.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities holding a slot bound to `id`.
    pub fn dependents_of(&self, id: EntityId) -> Vec<EntityRef> {
        self.dependers.get(&id).cloned().unwrap_or_default()
    }

    pub fn has_dependents(&self, id: EntityId) -> bool {
        self.dependers.contains_key(&id)
    }

    fn resolve(&mut self, entity: &EntityRef) -> Result<()> {
        let Some(depends) = entity.depends() else {
            return Ok(());
        };
        depends.reset();
        let wanted = depends.len();
        if wanted == 0 {
            return Ok(());
        }

        let mut order: Vec<usize> = (0..self.entities.len()).collect();
        order.shuffle(&mut self.shuffler);

        let mut bound = vec![false; wanted];
        let mut have = 0;
        for index in order {
            let candidate = self.entities[index].clone();
            if !self.allow_self_match && candidate.equals(&**entity) {
                continue;
            }
            for (slot, filter) in depends.filters().iter().enumerate() {
                if bound[slot] || !filter.satisfies(&*candidate) {
                    continue;
                }
                bound[slot] = true;
                depends.bind(slot, candidate.clone());
                self.dependers
                    .entry(candidate.id())
                    .or_default()
                    .push(entity.clone());
                have += 1;
                if have == wanted {
                    debug!("Resolved {} dependencies of entity {}", wanted, entity.id());
                    return Ok(());
                }
            }
        }

        debug!(
            "Entity {} resolved {} of {} dependencies",
            entity.id(),
            have,
            wanted
        );
        Err(EcsError::UnmetDependency)
    }

    /// Drop `dependent` from the reverse index entry of `target`.
    fn unlink(&mut self, dependent: &EntityRef, target: EntityId) {
        let Some(dependents) = self.dependers.get_mut(&target) else {
            return;
        };
        if let Some(pos) = dependents.iter().position(|d| d.equals(&**dependent)) {
            dependents.remove(pos);
        }
        if dependents.is_empty() {
            self.dependers.remove(&target);
        }
    }
}

impl<R: Rng + Send + Sync + 'static> System for DependsSystem<R> {
    /// The entity joins the pool before matching, so it is its own candidate.
    /// On failure it stays in the pool; the state's rollback removes it.
    fn add(&mut self, entity: &EntityRef) -> Result<()> {
        self.entities.push(entity.clone());
        self.resolve(entity)
    }

    fn remove(&mut self, entity: &EntityRef) {
        if let Some(pos) = self.entities.iter().position(|e| e.equals(&**entity)) {
            self.entities.remove(pos);
        }

        if let Some(depends) = entity.depends() {
            for target in depends.unbind_all() {
                self.unlink(entity, target.id());
            }
        }

        let Some(dependents) = self.dependers.remove(&entity.id()) else {
            return;
        };
        if let Some(commands) = self.commands.clone() {
            for dependent in dependents {
                debug!(
                    "Entity {} lost dependency {}; queueing removal",
                    dependent.id(),
                    entity.id()
                );
                commands.remove(dependent);
            }
            return;
        }

        warn!(
            "DependsSystem is not registered with a state; removing {} dependents of {} locally",
            dependents.len(),
            entity.id()
        );
        for dependent in dependents {
            self.remove(&dependent);
        }
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn init(&mut self, commands: Commands) {
        self.commands = Some(commands);
    }

    fn name(&self) -> &'static str {
        "DependsSystem"
    }
}
