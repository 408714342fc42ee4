//! 叙述缓存模块：按请求指纹缓存叙述结果，并合并并发的相同请求。
//!
//! # Narrative Cache Module
//!
//! Each unique `(decision, probability, top features)` combination is sent to the
//! narrative backend at most once at a time, and never again after it succeeds.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`NarrativeCache`] | Cache service: completed store + single-flight in-flight map |
//! | [`RequestFingerprint`] | Normalized request key (SHA-256 of the canonical inputs) |
//! | [`FingerprintGenerator`] | Key derivation with configurable probability precision |
//! | [`CacheStats`] | Hit / coalesce / fetch / failure counters |
//!
//! ## Lookup order
//!
//! 1. Completed narrative for the fingerprint: returned without a backend call.
//! 2. In-flight attempt for the fingerprint: awaited. If it fails, the waiter looks up
//!    again once (joining a newer attempt or starting its own).
//! 3. Otherwise a new attempt is started on a detached task and registered.
//!
//! Failures are never cached. Completed narratives are never overwritten or evicted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use credit_explain::cache::NarrativeCache;
//! use credit_explain::transport::{HttpTransport, TransportConfig};
//! use credit_explain::types::{Decision, FeatureContext, FeatureValue, ShapFeature};
//! use std::sync::Arc;
//!
//! # async fn run() -> credit_explain::Result<()> {
//! let backend = Arc::new(HttpTransport::new(&TransportConfig::from_env())?);
//! let cache = NarrativeCache::new(backend);
//!
//! let top = vec![ShapFeature::new("credit_history", FeatureValue::from("critical"), 0.41)];
//! let narrative = cache
//!     .get_narrative(Decision::Rejected, 0.732, &top, &FeatureContext::new())
//!     .await?;
//! println!("{}", narrative.narrative);
//! # Ok(())
//! # }
//! ```

mod key;
mod manager;
mod store;

pub use key::{FingerprintGenerator, RequestFingerprint, DEFAULT_PROBABILITY_PRECISION};
pub use manager::{CacheStats, NarrativeCache};
