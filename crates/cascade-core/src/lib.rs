//! # cascade-core
//!
//! Foundation crate for the Cascade engine.
//! Defines the boundary models, errors, config, and constants shared by
//! the graph, learning, and validation crates.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;

// Re-export the most commonly used types at the crate root.
pub use config::{CascadeConfig, PropagationConfig, SimulationConfig};
pub use errors::{CascadeError, CascadeResult, ConfigError, GraphError, OutcomeError};
pub use models::{Event, Outcome};
