use std::any::Any;

use crate::commands::Commands;
use crate::entity::EntityRef;
use crate::error::Result;

/// A stage of the pipeline that reacts to entity admission, removal and
/// periodic updates.
///
/// `priority` and `init` are optional capabilities: the defaults give
/// priority 0 and no initialisation.
pub trait System: Send + Sync + 'static {
    /// Admit an entity. An error aborts admission in every system.
    fn add(&mut self, entity: &EntityRef) -> Result<()>;

    /// Forget an entity. Must tolerate entities it never admitted.
    fn remove(&mut self, entity: &EntityRef);

    /// Called once per `State::update`. `tick` is whatever the host passes:
    /// a time delta, a frame counter, a run-level.
    fn update(&mut self, _tick: &dyn Any) {}

    /// Systems run from smallest to largest priority.
    fn priority(&self) -> i32 {
        0
    }

    /// Called once when the system is registered with a state.
    fn init(&mut self, _commands: Commands) {}

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Type-erased access to the concrete system, used for typed lookup.
pub(crate) trait AnySystem: System {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: System> AnySystem for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::testing::{new_log, Recorder, Thing};

    struct Bare;

    impl System for Bare {
        fn add(&mut self, _entity: &EntityRef) -> Result<()> {
            Ok(())
        }

        fn remove(&mut self, _entity: &EntityRef) {}
    }

    #[test]
    fn defaults() {
        let mut bare = Bare;
        assert_eq!(bare.priority(), 0);
        assert!(bare.name().ends_with("Bare"));
        bare.update(&0.016f32);
    }

    #[test]
    fn downcast_through_any_system() {
        let log = new_log();
        let boxed: Box<dyn AnySystem> = Box::new(Recorder::new("r", 3, &log));
        assert_eq!(boxed.priority(), 3);
        let recorder = boxed.as_any().downcast_ref::<Recorder>().unwrap();
        assert_eq!(recorder.label, "r");
        assert!(boxed.as_any().downcast_ref::<Bare>().is_none());
    }

    #[test]
    fn recorder_tracks_entities() {
        let log = new_log();
        let mut recorder = Recorder::new("r", 0, &log);
        let thing: EntityRef = Thing::plain();
        thing.identity().assign();
        recorder.add(&thing).unwrap();
        assert!(recorder.known.contains(&thing.id()));
        recorder.remove(&thing);
        assert!(recorder.known.is_empty());
        assert_eq!(*log.lock(), vec!["r.add", "r.remove"]);
    }
}
