//! Narrative generation: chain explanations, per-effect narratives, and
//! ranked cascade explanations.

pub mod builder;
pub mod confidence;
pub mod templates;

use crate::graph::CausalGraph;
use crate::propagation::{Cascade, Effect};

pub use builder::{
    explain_cascade, explain_effect, format_explanation_text, generate_narrative,
    render_explanation, trace_causal_chain, CascadeCounts, CascadeExplanation, CausalExplanation,
    CausalStep, ConfidenceFactors, ExplainedEffect,
};
pub use confidence::ConfidenceLevel;

/// Narrative generator wrapping the builder.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeGenerator {
    top_n: usize,
}

impl Default for NarrativeGenerator {
    fn default() -> Self {
        Self {
            top_n: cascade_core::config::defaults::DEFAULT_EXPLAIN_TOP_N,
        }
    }
}

impl NarrativeGenerator {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn explain(&self, effect: &Effect, cascade: &Cascade, graph: &CausalGraph) -> CausalExplanation {
        explain_effect(effect, cascade, graph)
    }

    /// Explain the top effects of a cascade.
    pub fn explain_cascade(&self, cascade: &Cascade, graph: &CausalGraph) -> CascadeExplanation {
        explain_cascade(cascade, graph, self.top_n)
    }

    pub fn render(&self, effect: &Effect, graph: &CausalGraph) -> String {
        render_explanation(effect, graph)
    }
}
