//! # cascade-observability
//!
//! Tracing subscriber setup and the structured log events emitted by the
//! graph, propagation, learning, and validation crates.

pub mod tracing_setup;

pub use tracing_setup::events;
pub use tracing_setup::{init_from_config, init_tracing, init_tracing_with_filter};
