//! # credit-explain
//!
//! 信用评分可解释性工具的叙述客户端：为银行职员生成决策解释文本。
//!
//! Narrative client for a credit-scoring explainability tool. Given a model decision,
//! its probability and the SHAP attribution of the applicant's features, it obtains a
//! natural-language explanation from the explanation backend.
//!
//! ## Core Guarantees
//!
//! - **Single-flight**: at most one backend call is outstanding per request fingerprint;
//!   concurrent identical requests attach to it
//! - **Write-once cache**: a successful narrative is kept for the life of the cache and
//!   never overwritten; failures are never cached
//! - **Detached attempts**: a started backend call completes and is cached even if the
//!   caller that triggered it went away
//! - **Typed failures**: [`transport::FetchError`] distinguishes transport, timeout,
//!   HTTP status and decoding failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use credit_explain::{Decision, ExplainClient, FeatureContext, FeatureValue, ShapFeature};
//!
//! #[tokio::main]
//! async fn main() -> credit_explain::Result<()> {
//!     let client = ExplainClient::builder()
//!         .base_url_override("http://localhost:8000")
//!         .build()?;
//!
//!     let shap = vec![
//!         ShapFeature::new("credit_history", FeatureValue::from("critical"), 0.41),
//!         ShapFeature::new("duration", FeatureValue::from(48i64), 0.22),
//!     ];
//!     let outcome = client
//!         .explain(Decision::Rejected, 0.732, &shap, &FeatureContext::new())
//!         .await;
//!     println!("{}", outcome.narrative().narrative);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Fingerprinting, completed store and single-flight coalescing |
//! | [`client`] | Client builder, top-N selection and templated fallback policy |
//! | [`transport`] | Backend trait and HTTP implementation |
//! | [`narrative`] | Feature labels, value formatting, fallback template |
//! | [`types`] | Decisions, SHAP features, requests and narratives |

pub mod cache;
pub mod client;
pub mod narrative;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use cache::{CacheStats, NarrativeCache, RequestFingerprint};
pub use client::{ExplainClient, ExplainClientBuilder, NarrativeOutcome};
pub use types::{Decision, FeatureContext, FeatureValue, Impact, Narrative, ShapFeature};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
