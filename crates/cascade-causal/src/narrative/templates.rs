//! Explanation templates keyed on relationship keywords.

/// Relationship families that get a dedicated template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    SupplyChain,
    Sector,
    Competition,
    Other,
}

impl RelationshipKind {
    /// Classify a relationship label ("supplier_to", "sector_member", ...)
    /// by keyword.
    pub fn classify(relationship_type: &str) -> Self {
        if relationship_type.contains("supplier") || relationship_type.contains("customer") {
            Self::SupplyChain
        } else if relationship_type.contains("sector") {
            Self::Sector
        } else if relationship_type.contains("competes") {
            Self::Competition
        } else {
            Self::Other
        }
    }
}

/// "supplier_to" → "supplier to".
pub fn relationship_words(relationship_type: &str) -> String {
    relationship_type.replace('_', " ")
}

/// One-sentence explanation of a single link.
pub fn step_explanation(
    relationship_type: &str,
    source_name: &str,
    target_name: &str,
    strength: f64,
    delay_days: f64,
) -> String {
    let relationship = relationship_words(relationship_type);
    match RelationshipKind::classify(relationship_type) {
        RelationshipKind::SupplyChain => format!(
            "{target_name} is a {relationship} {source_name}. A {:.0}% revenue dependency \
             means significant exposure to {source_name}'s performance.",
            strength * 100.0
        ),
        RelationshipKind::Sector => format!(
            "{source_name} is a component of {target_name} ETF. Movements typically \
             propagate within {delay_days:.1} days."
        ),
        RelationshipKind::Competition => format!(
            "{source_name} competes with {target_name}. Weakness in one may benefit or \
             concern the other."
        ),
        RelationshipKind::Other => {
            format!("{source_name} has a {relationship} relationship with {target_name}.")
        }
    }
}

/// Sentence describing how far down the chain the effect sits.
pub fn order_sentence(order: u32, effect_name: &str, day: f64) -> String {
    match order {
        1 => format!("As a directly connected entity, {effect_name} is expected to react."),
        2 => format!(
            "This cascades through the supply chain/sector to affect {effect_name} \
             within {day:.0} days."
        ),
        n => format!(
            "Through a {n}-step causal chain, {effect_name} is predicted to be affected \
             by day {day:.0}."
        ),
    }
}

pub const LOW_CONFIDENCE_SUFFIX: &str = " [lower confidence due to indirect relationship]";

pub const LOW_CONFIDENCE_NOTE: &str = "Note: This is a lower-confidence prediction due to \
                                       the indirect relationship and multiple inference steps.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_keyword() {
        assert_eq!(RelationshipKind::classify("supplier_to"), RelationshipKind::SupplyChain);
        assert_eq!(RelationshipKind::classify("customer_of"), RelationshipKind::SupplyChain);
        assert_eq!(RelationshipKind::classify("sector_member"), RelationshipKind::Sector);
        assert_eq!(RelationshipKind::classify("competes_with"), RelationshipKind::Competition);
        assert_eq!(RelationshipKind::classify("rate_sensitive"), RelationshipKind::Other);
    }

    #[test]
    fn supply_chain_template_mentions_dependency() {
        let text = step_explanation("supplier_to", "TSMC", "Apple", 0.25, 2.0);
        assert_eq!(
            text,
            "Apple is a supplier to TSMC. A 25% revenue dependency means significant \
             exposure to TSMC's performance."
        );
    }

    #[test]
    fn fallback_template() {
        let text = step_explanation("rate_sensitive", "Fed", "Bank", 0.3, 1.0);
        assert_eq!(text, "Fed has a rate sensitive relationship with Bank.");
    }
}
