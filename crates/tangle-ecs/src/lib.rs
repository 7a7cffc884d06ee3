//! Tangle ECS - Entity Component System with dependency resolution
//!
//! A `State` is an ordered pipeline of systems. Entities are admitted to every
//! system or to none, and the `DependsSystem` lets an entity require other
//! entities, matched by filters, before it is admitted. Removing an entity
//! cascades to everything that depends on it.

mod commands;
mod depends;
mod depends_system;
mod entity;
mod error;
mod filter;
mod state;
mod system;

#[cfg(test)]
mod testing;

pub use commands::Commands;
pub use depends::Depends;
pub use depends_system::DependsSystem;
pub use entity::{Capability, Entity, EntityRef, Name};
pub use error::{EcsError, Result};
pub use filter::{AllOf, Filter, IdFilter, NameFilter, TypeFilter};
pub use state::State;
pub use system::System;
pub use tangle_core::{DependsConfig, EntityId, Id};
