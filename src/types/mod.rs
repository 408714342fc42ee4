//! 类型系统模块：信用评分解释所需的核心数据类型。
//!
//! # Types Module
//!
//! Strongly-typed representations of what the explanation backend consumes and
//! returns: model decisions, SHAP feature attributions and narratives.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Decision`] | Model decision (approved / rejected) |
//! | [`ShapFeature`] | One feature with its value and SHAP attribution |
//! | [`FeatureValue`] | Raw applicant value (text, number or flag) |
//! | [`FeatureContext`] | The full applicant record sent as backend context |
//! | [`NarrativeRequest`] | Wire body of a narrative request |
//! | [`Narrative`] | Narrative text plus whether it was model-generated |
//!
//! ## Example
//!
//! ```rust
//! use credit_explain::types::{Decision, FeatureValue, ShapFeature};
//!
//! let feature = ShapFeature::new("credit_history", FeatureValue::from("critical"), 0.21);
//! assert!(feature.raises_risk());
//! assert_eq!(Decision::Rejected.as_str(), "rejected");
//! ```

pub mod feature;
pub mod narrative;

pub use feature::{Decision, FeatureContext, FeatureValue, Impact, ShapFeature};
pub use narrative::{Narrative, NarrativeRequest, NarrativeResponse};
