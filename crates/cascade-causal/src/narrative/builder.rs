//! Explanation construction: chain tracing, narratives, cascade rankings.

use serde::{Deserialize, Serialize};

use cascade_core::constants::LOW_CONFIDENCE_CAVEAT;
use cascade_core::models::Event;

use crate::graph::{CausalGraph, CausalLink};
use crate::propagation::{Cascade, ChainStep, Effect, EffectReport, TriggerSummary};

use super::confidence::{chain_length_penalty, ConfidenceLevel};
use super::templates;

/// One link of an explained chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalStep {
    #[serde(rename = "from")]
    pub from_entity: String,
    #[serde(rename = "to")]
    pub to_entity: String,
    pub relationship: String,
    pub strength: f64,
    pub delay_days: f64,
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub explanation: String,
}

/// How the final confidence of an effect breaks down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    /// Confidence the trigger is seeded with.
    pub base_confidence: f64,
    pub chain_length_penalty: f64,
    /// Weakest link confidence along the chain.
    pub relationship_confidence: f64,
    pub final_confidence: f64,
}

impl ConfidenceFactors {
    /// Factors in display order.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("base_confidence", self.base_confidence),
            ("chain_length_penalty", self.chain_length_penalty),
            ("relationship_confidence", self.relationship_confidence),
            ("final_confidence", self.final_confidence),
        ]
    }
}

/// Full explanation of one predicted effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CausalExplanation {
    pub effect: Effect,
    pub trigger: Event,
    pub steps: Vec<CausalStep>,
    pub narrative: String,
    pub confidence_factors: ConfidenceFactors,
    pub confidence_level: ConfidenceLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CascadeCounts {
    pub total_effects: usize,
    pub first_order: usize,
    pub second_order: usize,
    pub third_order: usize,
}

/// Explained top effects of a cascade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeExplanation {
    pub trigger: TriggerSummary,
    pub summary: CascadeCounts,
    pub top_effects: Vec<ExplainedEffect>,
}

/// Serializable view of a `CausalExplanation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedEffect {
    pub effect: EffectReport,
    pub steps: Vec<CausalStep>,
    pub narrative: String,
    pub confidence_factors: ConfidenceFactors,
    pub confidence_level: ConfidenceLevel,
}

impl From<&CausalExplanation> for ExplainedEffect {
    fn from(explanation: &CausalExplanation) -> Self {
        Self {
            effect: EffectReport::from(&explanation.effect),
            steps: explanation.steps.clone(),
            narrative: explanation.narrative.clone(),
            confidence_factors: explanation.confidence_factors,
            confidence_level: explanation.confidence_level,
        }
    }
}

fn display_name<'a>(graph: &'a CausalGraph, entity_id: &'a str) -> &'a str {
    graph
        .get_entity(entity_id)
        .map(|e| e.name.as_str())
        .unwrap_or(entity_id)
}

fn beat_or_miss(magnitude: f64) -> &'static str {
    if magnitude > 0.0 {
        "beat"
    } else {
        "miss"
    }
}

/// One-line chain explanation:
/// `"NVDA earnings miss of 8.0% → Nvidia → TSMC (supplier to)"`.
///
/// Entity display names come from the graph, falling back to ids. Effects
/// below 0.5 confidence carry a caveat suffix. Empty chains give "".
pub fn render_explanation(effect: &Effect, graph: &CausalGraph) -> String {
    let mut parts = Vec::with_capacity(effect.cause_chain.len());
    for step in &effect.cause_chain {
        match step {
            ChainStep::Trigger(event) => parts.push(format!(
                "{} earnings {} of {:.1}%",
                event.entity,
                beat_or_miss(event.magnitude),
                event.magnitude.abs() * 100.0
            )),
            ChainStep::Link(link) => parts.push(format!(
                "{} → {} ({})",
                display_name(graph, &link.source),
                display_name(graph, &link.target),
                templates::relationship_words(&link.relationship_type)
            )),
        }
    }
    if parts.is_empty() {
        return String::new();
    }

    let mut explanation = parts.join(" → ");
    if effect.confidence < LOW_CONFIDENCE_CAVEAT {
        explanation.push_str(templates::LOW_CONFIDENCE_SUFFIX);
    }
    explanation
}

fn causal_step(link: &CausalLink, graph: &CausalGraph) -> CausalStep {
    CausalStep {
        from_entity: link.source.clone(),
        to_entity: link.target.clone(),
        relationship: link.relationship_type.clone(),
        strength: link.strength,
        delay_days: link.delay_mean,
        confidence: link.confidence,
        evidence: link.evidence.clone(),
        explanation: templates::step_explanation(
            &link.relationship_type,
            display_name(graph, &link.source),
            display_name(graph, &link.target),
            link.strength,
            link.delay_mean,
        ),
    }
}

/// Links of the effect's chain as explained steps.
pub fn trace_causal_chain(effect: &Effect, graph: &CausalGraph) -> Vec<CausalStep> {
    effect.links().map(|link| causal_step(link, graph)).collect()
}

/// Multi-sentence narrative for an effect.
pub fn generate_narrative(
    effect: &Effect,
    trigger: &Event,
    steps: &[CausalStep],
    graph: &CausalGraph,
) -> String {
    let trigger_name = display_name(graph, &trigger.entity);
    let effect_name = display_name(graph, &effect.entity);

    let mut parts = vec![
        format!(
            "{trigger_name} reported earnings {} of {:.1}%.",
            beat_or_miss(trigger.magnitude),
            trigger.magnitude.abs() * 100.0
        ),
        templates::order_sentence(effect.order, effect_name, effect.day),
    ];
    parts.extend(steps.iter().take(2).map(|s| s.explanation.clone()));

    let sign = if effect.magnitude > 0.0 { "+" } else { "" };
    let (low, high) = effect.magnitude_range();
    parts.push(format!(
        "Predicted impact on {effect_name}: {sign}{:.1}% (range: {:+.1}% to {:+.1}%, confidence: {:.0}%).",
        effect.magnitude_percent(),
        low * 100.0,
        high * 100.0,
        effect.confidence * 100.0
    ));

    if effect.confidence < LOW_CONFIDENCE_CAVEAT {
        parts.push(templates::LOW_CONFIDENCE_NOTE.to_string());
    }

    parts.join(" ")
}

/// Explain one effect of `cascade`.
pub fn explain_effect(effect: &Effect, cascade: &Cascade, graph: &CausalGraph) -> CausalExplanation {
    let steps = trace_causal_chain(effect, graph);
    let narrative = generate_narrative(effect, &cascade.trigger, &steps, graph);

    let relationship_confidence = steps
        .iter()
        .map(|s| s.confidence)
        .reduce(f64::min)
        .unwrap_or(1.0);
    let confidence_factors = ConfidenceFactors {
        base_confidence: 1.0,
        chain_length_penalty: chain_length_penalty(effect.order),
        relationship_confidence,
        final_confidence: effect.confidence,
    };

    CausalExplanation {
        effect: effect.clone(),
        trigger: cascade.trigger.clone(),
        steps,
        narrative,
        confidence_factors,
        confidence_level: ConfidenceLevel::from_score(effect.confidence),
    }
}

/// Explain the `top_n` effects ranked by `|magnitude| × confidence`.
pub fn explain_cascade(cascade: &Cascade, graph: &CausalGraph, top_n: usize) -> CascadeExplanation {
    let mut ranked: Vec<&Effect> = cascade.effects.iter().collect();
    ranked.sort_by(|a, b| {
        let score_a = a.magnitude.abs() * a.confidence;
        let score_b = b.magnitude.abs() * b.confidence;
        score_b.total_cmp(&score_a)
    });

    let top_effects = ranked
        .into_iter()
        .take(top_n)
        .map(|effect| ExplainedEffect::from(&explain_effect(effect, cascade, graph)))
        .collect();

    let report = cascade.report();
    CascadeExplanation {
        trigger: report.trigger,
        summary: CascadeCounts {
            total_effects: cascade.effects.len(),
            first_order: cascade.first_order_effects().len(),
            second_order: cascade.second_order_effects().len(),
            third_order: cascade.third_order_effects().len(),
        },
        top_effects,
    }
}

/// Plain-text rendering of an explanation.
pub fn format_explanation_text(explanation: &CausalExplanation) -> String {
    let mut lines = vec![
        format!("Effect on {}", explanation.effect.entity),
        "=".repeat(40),
        String::new(),
        "Causal Chain:".to_string(),
    ];

    for (i, step) in explanation.steps.iter().enumerate() {
        lines.push(format!("  {}. {} → {}", i + 1, step.from_entity, step.to_entity));
        lines.push(format!("     Relationship: {}", step.relationship));
        lines.push(format!(
            "     Strength: {:.2}, Delay: {:.1} days",
            step.strength, step.delay_days
        ));
        if let Some(first) = step.evidence.first() {
            lines.push(format!("     Evidence: {first}"));
        }
        lines.push(String::new());
    }

    lines.push("Narrative:".to_string());
    lines.push(explanation.narrative.clone());
    lines.push(String::new());
    lines.push(format!(
        "Confidence Breakdown ({}):",
        explanation.confidence_level.as_str()
    ));
    for (factor, value) in explanation.confidence_factors.entries() {
        lines.push(format!("  - {factor}: {value:.3}"));
    }

    lines.join("\n")
}
