//! Request fingerprinting.

use crate::types::{Decision, FeatureValue, ShapFeature};
use crate::{Error, ErrorContext, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Decimal places kept from the probability before hashing.
///
/// Digits past the fourth differ between otherwise identical scoring runs.
pub const DEFAULT_PROBABILITY_PRECISION: usize = 4;
const MAX_PROBABILITY_PRECISION: usize = 12;

/// Cache and single-flight key for a narrative request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log fields.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct Canonical<'a> {
    decision: &'a str,
    probability: String,
    features: Vec<(&'a str, &'a FeatureValue)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    salt: Option<&'a str>,
}

/// Derives [`RequestFingerprint`]s from `(decision, probability, top features)`.
///
/// Only the feature name and value take part, in the given order. SHAP magnitudes
/// and the applicant context do not change the key.
#[derive(Debug, Clone)]
pub struct FingerprintGenerator {
    precision: usize,
    salt: Option<String>,
}

impl FingerprintGenerator {
    pub fn new() -> Self {
        Self {
            precision: DEFAULT_PROBABILITY_PRECISION,
            salt: None,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision.min(MAX_PROBABILITY_PRECISION);
        self
    }

    /// Namespace keys, e.g. per model version.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Fixed-precision rendering of the probability used in the key.
    pub fn round_probability(&self, probability: f64) -> String {
        let rendered = format!("{:.*}", self.precision, probability);
        // -0.0 and values that round to zero share one spelling
        if rendered.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
            format!("{:.*}", self.precision, 0.0)
        } else {
            rendered
        }
    }

    pub fn generate(
        &self,
        decision: Decision,
        probability: f64,
        top_features: &[ShapFeature],
    ) -> Result<RequestFingerprint> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(Error::validation_with_context(
                "probability must be a finite number in [0, 1]",
                ErrorContext::new()
                    .with_field_path("probability")
                    .with_details(format!("got {}", probability))
                    .with_source("fingerprint"),
            ));
        }
        // non-finite numbers all serialize as `null` and would share a key
        for (i, f) in top_features.iter().enumerate() {
            if let FeatureValue::Number(n) = f.value {
                if !n.is_finite() {
                    return Err(Error::validation_with_context(
                        "feature values must be finite numbers",
                        ErrorContext::new()
                            .with_field_path(format!("top_features[{}].value", i))
                            .with_details(format!("{} = {}", f.feature, n))
                            .with_source("fingerprint"),
                    ));
                }
            }
        }

        let canonical = Canonical {
            decision: decision.as_str(),
            probability: self.round_probability(probability),
            features: top_features
                .iter()
                .map(|f| (f.feature.as_str(), &f.value))
                .collect(),
            salt: self.salt.as_deref(),
        };
        let encoded = serde_json::to_vec(&canonical)?;

        let mut hasher = Sha256::new();
        hasher.update(&encoded);
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Ok(RequestFingerprint(hash))
    }
}

impl Default for FingerprintGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> Vec<ShapFeature> {
        vec![
            ShapFeature::new("credit_history", FeatureValue::from("critical"), 0.41),
            ShapFeature::new("duration", FeatureValue::from(48i64), 0.22),
        ]
    }

    fn key(probability: f64, features: &[ShapFeature]) -> RequestFingerprint {
        FingerprintGenerator::new()
            .generate(Decision::Rejected, probability, features)
            .unwrap()
    }

    #[test]
    fn identical_inputs_share_a_fingerprint() {
        assert_eq!(key(0.732, &features()), key(0.732, &features()));
        assert_eq!(key(0.732, &features()).as_str().len(), 64);
    }

    #[test]
    fn probability_noise_below_precision_is_ignored() {
        assert_eq!(key(0.732, &features()), key(0.73200004, &features()));
        assert_ne!(key(0.732, &features()), key(0.7321, &features()));
    }

    #[test]
    fn decision_feature_and_value_changes_alter_the_key() {
        let base = key(0.732, &features());

        let approved = FingerprintGenerator::new()
            .generate(Decision::Approved, 0.732, &features())
            .unwrap();
        assert_ne!(base, approved);

        let mut changed_value = features();
        changed_value[0].value = FeatureValue::from("existing paid");
        assert_ne!(base, key(0.732, &changed_value));

        let mut renamed = features();
        renamed[1].feature = "credit_amount".into();
        assert_ne!(base, key(0.732, &renamed));

        let mut reordered = features();
        reordered.reverse();
        assert_ne!(base, key(0.732, &reordered));
    }

    #[test]
    fn shap_magnitudes_do_not_alter_the_key() {
        let mut shifted = features();
        shifted[0].shap_value = 0.05;
        assert_eq!(key(0.732, &features()), key(0.732, &shifted));
    }

    #[test]
    fn negative_zero_normalizes() {
        let gen = FingerprintGenerator::new();
        assert_eq!(gen.round_probability(-0.0), "0.0000");
        assert_eq!(gen.round_probability(0.00001), "0.0000");
        assert_eq!(key(-0.0, &features()), key(0.0, &features()));
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let gen = FingerprintGenerator::new();
        for p in [f64::NAN, f64::INFINITY, -0.1, 1.5] {
            let err = gen.generate(Decision::Rejected, p, &features()).unwrap_err();
            assert!(matches!(err, Error::Validation { .. }), "{}", p);
        }
    }

    #[test]
    fn non_finite_feature_values_are_rejected() {
        let gen = FingerprintGenerator::new();
        for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut set = features();
            set[1].value = FeatureValue::Number(n);
            let err = gen.generate(Decision::Rejected, 0.5, &set).unwrap_err();
            let field = err.context().and_then(|c| c.field_path.clone());
            assert_eq!(field.as_deref(), Some("top_features[1].value"), "{}", n);
        }
        assert!(gen
            .generate(Decision::Rejected, 0.5, &[ShapFeature::new("age", FeatureValue::Number(35.0), 0.1)])
            .is_ok());
    }

    #[test]
    fn salt_and_precision_are_part_of_the_key() {
        let plain = FingerprintGenerator::new();
        let salted = FingerprintGenerator::new().with_salt("model-v2");
        assert_ne!(
            plain.generate(Decision::Rejected, 0.5, &features()).unwrap(),
            salted.generate(Decision::Rejected, 0.5, &features()).unwrap()
        );

        let coarse = FingerprintGenerator::new().with_precision(2);
        assert_eq!(coarse.round_probability(0.7349), "0.73");
        assert_eq!(FingerprintGenerator::new().with_precision(40).precision(), 12);
    }
}
