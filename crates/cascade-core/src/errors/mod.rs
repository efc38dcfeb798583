//! Error handling for Cascade.
//! One error enum per subsystem, `thiserror` only.

pub mod cascade_error;
pub mod config_error;
pub mod graph_error;
pub mod outcome_error;

pub use cascade_error::{CascadeError, CascadeResult};
pub use config_error::ConfigError;
pub use graph_error::{EndpointRole, GraphError};
pub use outcome_error::OutcomeError;
