use std::any::Any;
use std::collections::HashSet;

use tangle_core::EntityId;
use tracing::{debug, info, warn};

use crate::commands::Commands;
use crate::entity::{Entity, EntityRef};
use crate::error::Result;
use crate::system::{AnySystem, System};

/// The entity-component-system: an ordered pipeline of systems.
///
/// Systems are kept sorted by ascending priority. Admission is
/// transactional: an entity ends up known to every system or to none.
pub struct State {
    systems: Vec<Box<dyn AnySystem>>,
    commands: Commands,
}

impl State {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            commands: Commands::new(),
        }
    }

    /// Register a system. Its `init` hook receives this state's command
    /// queue, then the pipeline is re-sorted by priority.
    pub fn add_system<S: System>(&mut self, mut system: S) {
        system.init(self.commands.clone());
        info!(
            "Registered system {} with priority {}",
            system.name(),
            system.priority()
        );
        self.systems.push(Box::new(system));
        self.systems.sort_by_key(|s| s.priority());
    }

    /// Add an entity to all systems.
    ///
    /// Assigns an id if the entity has none. If a system fails, the entity is
    /// removed again from that system and every system before it, and the
    /// error is returned unchanged.
    pub fn add(&mut self, entity: EntityRef) -> Result<()> {
        let id = entity.identity().assign();
        for i in 0..self.systems.len() {
            if let Err(err) = self.systems[i].add(&entity) {
                warn!(
                    "System {} refused entity {}: {}; rolling back",
                    self.systems[i].name(),
                    id,
                    err
                );
                for system in self.systems[..=i].iter_mut().rev() {
                    system.remove(&entity);
                }
                let mut visited = HashSet::from([id]);
                self.apply_commands(&mut visited);
                return Err(err);
            }
        }
        debug!("Added entity {}", id);
        let mut visited = HashSet::new();
        self.apply_commands(&mut visited);
        Ok(())
    }

    /// Remove an entity from all systems, along with everything the systems
    /// queue for removal as a consequence (for example its dependents).
    pub fn remove(&mut self, entity: &EntityRef) {
        let mut visited = HashSet::new();
        self.dismiss(entity, &mut visited);
        self.apply_commands(&mut visited);
    }

    /// Run every system's update in priority order, then apply any removals
    /// the systems queued. `tick` is passed through untouched.
    pub fn update(&mut self, tick: &dyn Any) {
        for system in &mut self.systems {
            system.update(tick);
        }
        let mut visited = HashSet::new();
        self.apply_commands(&mut visited);
    }

    /// Apply removals queued on the command handle outside of `add`,
    /// `remove` and `update`.
    pub fn flush(&mut self) {
        let mut visited = HashSet::new();
        self.apply_commands(&mut visited);
    }

    /// A handle onto this state's removal queue.
    pub fn commands(&self) -> Commands {
        self.commands.clone()
    }

    /// First registered system of type `T`.
    pub fn system<T: System>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<T>())
    }

    pub fn system_mut<T: System>(&mut self) -> Option<&mut T> {
        self.systems
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Priorities in pipeline order.
    pub fn priorities(&self) -> Vec<i32> {
        self.systems.iter().map(|s| s.priority()).collect()
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Remove one entity from every system. Each id is dismissed at most once
    /// per pass, so a cyclic dependency graph cannot loop forever.
    fn dismiss(&mut self, entity: &EntityRef, visited: &mut HashSet<EntityId>) {
        if !visited.insert(entity.id()) {
            debug!("Entity {} already removed in this pass", entity.id());
            return;
        }
        for system in &mut self.systems {
            system.remove(entity);
        }
    }

    fn apply_commands(&mut self, visited: &mut HashSet<EntityId>) {
        while let Some(entity) = self.commands.pop() {
            debug!("Cascading removal to entity {}", entity.id());
            self.dismiss(&entity, visited);
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EcsError;
    use crate::testing::{new_log, Recorder, Thing};

    #[test]
    fn update_runs_in_priority_order() {
        let log = new_log();
        let mut state = State::new();
        state.add_system(Recorder::new("a", 1, &log));
        state.add_system(Recorder::new("b", 0, &log));

        state.update(&());
        assert_eq!(*log.lock(), vec!["b.update", "a.update"]);
    }

    #[test]
    fn priorities_sorted_regardless_of_registration_order() {
        let log = new_log();
        let mut state = State::new();
        for (label, priority) in [("x", 5), ("y", -2), ("z", 0), ("w", 3)] {
            state.add_system(Recorder::new(label, priority, &log));
        }
        assert_eq!(state.priorities(), vec![-2, 0, 3, 5]);
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn add_assigns_id() {
        let mut state = State::new();
        let thing = Thing::plain();
        assert!(thing.is_unassigned());
        state.add(thing.clone()).unwrap();
        assert!(!thing.is_unassigned());
    }

    #[test]
    fn add_keeps_existing_id() {
        let mut state = State::new();
        let thing = Thing::plain();
        let id = thing.identity().assign();
        state.add(thing.clone()).unwrap();
        assert_eq!(thing.id(), id);
    }

    #[test]
    fn add_reaches_every_system() {
        let log = new_log();
        let mut state = State::new();
        state.add_system(Recorder::new("a", 0, &log));
        state.add_system(Recorder::new("b", 1, &log));
        let thing = Thing::plain();
        state.add(thing.clone()).unwrap();

        assert_eq!(*log.lock(), vec!["a.add", "b.add"]);
        assert!(state.system::<Recorder>().unwrap().known.contains(&thing.id()));
    }

    #[test]
    fn failed_add_rolls_back_in_reverse_including_failing_system() {
        let log = new_log();
        let mut state = State::new();
        state.add_system(Recorder::new("a", 0, &log));
        state.add_system(Recorder::new("b", 1, &log).rejecting());
        state.add_system(Recorder::new("c", 2, &log));

        let thing = Thing::plain();
        let err = state.add(thing.clone()).unwrap_err();
        assert!(matches!(err, EcsError::Rejected { system: "b", .. }));
        assert_eq!(err.to_string(), "b refused the entity");
        assert_eq!(*log.lock(), vec!["a.add", "b.add", "b.remove", "a.remove"]);

        let a = state.system::<Recorder>().unwrap();
        assert!(a.known.is_empty());
    }

    #[test]
    fn remove_reaches_every_system() {
        let log = new_log();
        let mut state = State::new();
        state.add_system(Recorder::new("a", 0, &log));
        state.add_system(Recorder::new("b", 1, &log));
        let thing: EntityRef = Thing::plain();
        state.add(thing.clone()).unwrap();
        log.lock().clear();

        state.remove(&thing);
        assert_eq!(*log.lock(), vec!["a.remove", "b.remove"]);
        assert!(state.system::<Recorder>().unwrap().known.is_empty());
    }

    #[test]
    fn remove_of_unknown_entity_is_harmless() {
        let log = new_log();
        let mut state = State::new();
        state.add_system(Recorder::new("a", 0, &log));
        let thing: EntityRef = Thing::plain();
        state.remove(&thing);
        assert!(state.system::<Recorder>().unwrap().known.is_empty());
    }

    /// Removing one entity always queues the removal of its partner.
    struct Partners {
        pairs: Vec<(EntityRef, EntityRef)>,
        commands: Option<Commands>,
        removals: usize,
    }

    impl System for Partners {
        fn add(&mut self, _entity: &EntityRef) -> Result<()> {
            Ok(())
        }

        fn remove(&mut self, entity: &EntityRef) {
            self.removals += 1;
            let Some(commands) = &self.commands else {
                return;
            };
            for (a, b) in &self.pairs {
                if a.equals(&**entity) {
                    commands.remove(b.clone());
                } else if b.equals(&**entity) {
                    commands.remove(a.clone());
                }
            }
        }

        fn init(&mut self, commands: Commands) {
            self.commands = Some(commands);
        }
    }

    #[test]
    fn cyclic_cascade_terminates() {
        let a: EntityRef = Thing::plain();
        let b: EntityRef = Thing::plain();
        let mut state = State::new();
        state.add_system(Partners {
            pairs: vec![(a.clone(), b.clone())],
            commands: None,
            removals: 0,
        });
        state.add(a.clone()).unwrap();
        state.add(b.clone()).unwrap();

        state.remove(&a);
        assert_eq!(state.system::<Partners>().unwrap().removals, 2);
        assert!(state.commands().is_empty());
    }

    #[test]
    fn init_receives_state_queue() {
        let mut state = State::new();
        state.add_system(Partners {
            pairs: vec![],
            commands: None,
            removals: 0,
        });
        let partners = state.system::<Partners>().unwrap();
        assert!(partners
            .commands
            .as_ref()
            .unwrap()
            .same_queue(&state.commands()));
    }

    #[test]
    fn queued_removals_apply_on_flush() {
        let log = new_log();
        let mut state = State::new();
        state.add_system(Recorder::new("a", 0, &log));
        let thing: EntityRef = Thing::plain();
        state.add(thing.clone()).unwrap();

        state.commands().remove(thing.clone());
        assert!(!state.system::<Recorder>().unwrap().known.is_empty());
        state.flush();
        assert!(state.system::<Recorder>().unwrap().known.is_empty());
    }

    #[test]
    fn update_passes_tick_through() {
        struct Clock {
            elapsed: f32,
        }

        impl System for Clock {
            fn add(&mut self, _entity: &EntityRef) -> Result<()> {
                Ok(())
            }

            fn remove(&mut self, _entity: &EntityRef) {}

            fn update(&mut self, tick: &dyn Any) {
                if let Some(dt) = tick.downcast_ref::<f32>() {
                    self.elapsed += dt;
                }
            }
        }

        let mut state = State::new();
        state.add_system(Clock { elapsed: 0.0 });
        state.update(&0.5f32);
        state.update(&0.25f32);
        state.update(&"ignored");
        assert_eq!(state.system::<Clock>().unwrap().elapsed, 0.75);
        state.system_mut::<Clock>().unwrap().elapsed = 0.0;
        assert_eq!(state.system::<Clock>().unwrap().elapsed, 0.0);
    }
}
