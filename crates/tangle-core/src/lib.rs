//! Tangle Core - identity and configuration shared by the Tangle crates
//!
//! This crate provides:
//! - Process-wide unique entity identifiers and the `Id` component
//! - Configuration for the dependency resolution system
//! - Configuration error types

pub mod config;
pub mod error;
pub mod id;

pub use config::DependsConfig;
pub use error::ConfigError;
pub use id::{EntityId, Id};
