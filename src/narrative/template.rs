//! Templated local narrative used when the backend cannot produce one.

use super::humanize::{format_value, humanize_feature};
use crate::types::{Decision, Narrative, ShapFeature};

fn describe(features: &[&ShapFeature]) -> String {
    features
        .iter()
        .map(|f| format!("{} ({})", humanize_feature(&f.feature), format_value(&f.value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Deterministic explanation built from the decision and the given features.
///
/// The result is marked `is_generated = false`.
pub fn render_fallback(decision: Decision, probability: f64, features: &[ShapFeature]) -> Narrative {
    let mut text = format!(
        "The application was {} with a model probability of {:.1}%.",
        decision,
        probability * 100.0
    );

    let (raising, lowering): (Vec<&ShapFeature>, Vec<&ShapFeature>) =
        features.iter().partition(|f| f.raises_risk());

    if raising.is_empty() && lowering.is_empty() {
        text.push_str(" No individual factor stood out.");
    }
    if !raising.is_empty() {
        text.push_str(&format!(" Factors that raised the risk: {}.", describe(&raising)));
    }
    if !lowering.is_empty() {
        text.push_str(&format!(" Factors that lowered the risk: {}.", describe(&lowering)));
    }

    Narrative::new(text, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureValue;

    #[test]
    fn groups_features_by_direction() {
        let features = vec![
            ShapFeature::new("credit_history", FeatureValue::from("critical"), 0.41),
            ShapFeature::new("duration", FeatureValue::from(48i64), 0.2),
            ShapFeature::new("age", FeatureValue::from(52i64), -0.12),
        ];
        let n = render_fallback(Decision::Rejected, 0.732, &features);
        assert!(!n.is_generated);
        assert_eq!(
            n.narrative,
            "The application was rejected with a model probability of 73.2%. \
             Factors that raised the risk: Credit History (critical), Loan Duration (48). \
             Factors that lowered the risk: Age (52)."
        );
    }

    #[test]
    fn handles_no_features() {
        let n = render_fallback(Decision::Approved, 0.1, &[]);
        assert_eq!(
            n.narrative,
            "The application was approved with a model probability of 10.0%. No individual factor stood out."
        );
    }
}
