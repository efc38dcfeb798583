//! # cascade-causal
//!
//! The "what happens next" engine. Holds the causal graph of entities and
//! weighted, delayed links (`petgraph` backed), propagates shocks through it
//! into time-ordered cascades, simulates delay uncertainty, and renders
//! narrative explanations for predicted effects.

pub mod graph;
pub mod narrative;
pub mod propagation;

pub use graph::{merge_graphs, CausalGraph, CausalLink, Entity, GraphDocument, LinkKey};
pub use narrative::{
    explain_cascade, explain_effect, render_explanation, trace_causal_chain, CascadeExplanation,
    CausalExplanation, CausalStep, ConfidenceLevel, NarrativeGenerator,
};
pub use propagation::{
    propagate, propagate_with_explanation, propagate_with_rng, simulate_cascade,
    simulate_cascade_with, Cascade, ChainStep, Effect, EntityDistribution, PropagationEngine,
    SimulationSummary, TimelineBucket,
};
