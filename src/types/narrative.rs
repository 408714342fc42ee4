//! Narrative request/response shapes.

use super::feature::{Decision, FeatureContext, ShapFeature};
use serde::{Deserialize, Serialize};

/// Body of `POST {base_url}{narrative_path}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub decision: Decision,
    pub probability: f64,
    pub shap_features: Vec<ShapFeature>,
    pub all_features: FeatureContext,
}

/// Backend response as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct NarrativeResponse {
    pub narrative: String,
    #[serde(default)]
    pub is_llm_generated: bool,
}

/// A narrative explaining a decision.
///
/// `is_generated` is false when the text came from a template rather than a language model,
/// either on the backend or through the local fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub narrative: String,
    pub is_generated: bool,
}

impl Narrative {
    pub fn new(narrative: impl Into<String>, is_generated: bool) -> Self {
        Self {
            narrative: narrative.into(),
            is_generated,
        }
    }
}

impl From<NarrativeResponse> for Narrative {
    fn from(r: NarrativeResponse) -> Self {
        Self {
            narrative: r.narrative,
            is_generated: r.is_llm_generated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureValue;

    #[test]
    fn request_body_matches_backend_shape() {
        let mut all = FeatureContext::new();
        all.insert("age".into(), FeatureValue::Number(31.0));
        let req = NarrativeRequest {
            decision: Decision::Rejected,
            probability: 0.732,
            shap_features: vec![ShapFeature::new(
                "credit_history",
                FeatureValue::from("critical"),
                0.4,
            )],
            all_features: all,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["decision"], "rejected");
        assert_eq!(v["shap_features"][0]["feature"], "credit_history");
        assert_eq!(v["shap_features"][0]["value"], "critical");
        assert_eq!(v["shap_features"][0]["impact"], "positive");
        assert_eq!(v["all_features"]["age"], 31.0);
    }

    #[test]
    fn response_maps_llm_flag() {
        let r: NarrativeResponse =
            serde_json::from_str(r#"{"narrative":"Declined.","is_llm_generated":true}"#).unwrap();
        let n = Narrative::from(r);
        assert!(n.is_generated);
        assert_eq!(n.narrative, "Declined.");

        let r: NarrativeResponse = serde_json::from_str(r#"{"narrative":"x"}"#).unwrap();
        assert!(!Narrative::from(r).is_generated);
    }
}
