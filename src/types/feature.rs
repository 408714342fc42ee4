//! Decisions and SHAP feature attributions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Model decision for a credit application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw value of an applicant attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Flag(b) => write!(f, "{}", b),
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Text(s.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        FeatureValue::Text(s)
    }
}

impl From<f64> for FeatureValue {
    fn from(n: f64) -> Self {
        FeatureValue::Number(n)
    }
}

impl From<i64> for FeatureValue {
    fn from(n: i64) -> Self {
        FeatureValue::Number(n as f64)
    }
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        FeatureValue::Flag(b)
    }
}

/// Direction of a feature's contribution to the default risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Pushes towards rejection.
    Positive,
    /// Pushes towards approval.
    Negative,
}

impl Impact {
    pub fn from_shap(shap_value: f64) -> Self {
        if shap_value > 0.0 {
            Impact::Positive
        } else {
            Impact::Negative
        }
    }
}

/// A feature together with its SHAP attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapFeature {
    pub feature: String,
    pub value: FeatureValue,
    pub shap_value: f64,
    pub impact: Impact,
}

impl ShapFeature {
    /// Build a feature whose impact is derived from the sign of `shap_value`.
    pub fn new(feature: impl Into<String>, value: FeatureValue, shap_value: f64) -> Self {
        Self {
            feature: feature.into(),
            value,
            shap_value,
            impact: Impact::from_shap(shap_value),
        }
    }

    pub fn raises_risk(&self) -> bool {
        self.impact == Impact::Positive
    }
}

/// The full applicant record, keyed by feature name.
pub type FeatureContext = BTreeMap<String, FeatureValue>;
