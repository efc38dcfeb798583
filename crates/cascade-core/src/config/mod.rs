//! Configuration for every Cascade subsystem.
//! Each section deserializes with `#[serde(default)]`, so partial TOML works.

mod cascade_config;
pub mod defaults;
mod learning_config;
mod observability_config;
mod propagation_config;
mod simulation_config;
mod validation_config;

pub use cascade_config::CascadeConfig;
pub use learning_config::LearningConfig;
pub use observability_config::ObservabilityConfig;
pub use propagation_config::PropagationConfig;
pub use simulation_config::SimulationConfig;
pub use validation_config::ValidationConfig;
