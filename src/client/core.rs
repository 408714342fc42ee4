use crate::cache::NarrativeCache;
use crate::client::builder::ExplainClientBuilder;
use crate::narrative::render_fallback;
use crate::types::{Decision, FeatureContext, Narrative, ShapFeature};
use crate::{Error, Result};
use tracing::warn;

/// Explanation client: picks the features to explain, fetches narratives through the
/// shared cache, and falls back to a local template when the backend fails.
///
/// Build one at application start and share it; clones of [`ExplainClient::cache`]
/// see the same narratives.
pub struct ExplainClient {
    pub(crate) cache: NarrativeCache,
    pub(crate) top_n: usize,
}

/// Where a narrative came from.
#[derive(Debug)]
pub enum NarrativeOutcome {
    /// Produced by the backend (possibly served from the cache).
    Remote(Narrative),
    /// The backend call failed; `narrative` is the local templated explanation.
    Fallback { narrative: Narrative, error: Error },
}

impl NarrativeOutcome {
    pub fn narrative(&self) -> &Narrative {
        match self {
            NarrativeOutcome::Remote(n) => n,
            NarrativeOutcome::Fallback { narrative, .. } => narrative,
        }
    }

    pub fn into_narrative(self) -> Narrative {
        match self {
            NarrativeOutcome::Remote(n) => n,
            NarrativeOutcome::Fallback { narrative, .. } => narrative,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, NarrativeOutcome::Fallback { .. })
    }
}

impl ExplainClient {
    /// Client configured from the environment.
    pub fn new() -> Result<Self> {
        ExplainClientBuilder::new().build()
    }

    pub fn builder() -> ExplainClientBuilder {
        ExplainClientBuilder::new()
    }

    pub fn cache(&self) -> &NarrativeCache {
        &self.cache
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Narrative for an already selected feature set. Failures are returned as is.
    pub async fn narrative(
        &self,
        decision: Decision,
        probability: f64,
        top_features: &[ShapFeature],
        all_features: &FeatureContext,
    ) -> Result<Narrative> {
        self.cache
            .get_narrative(decision, probability, top_features, all_features)
            .await
    }

    /// Explain a decision from its full SHAP attribution.
    ///
    /// The top-N features by absolute SHAP value are sent. Any failure yields
    /// [`NarrativeOutcome::Fallback`]; nothing is retried here.
    pub async fn explain(
        &self,
        decision: Decision,
        probability: f64,
        features: &[ShapFeature],
        all_features: &FeatureContext,
    ) -> NarrativeOutcome {
        let top = select_top_features(features, self.top_n);
        match self
            .cache
            .get_narrative(decision, probability, &top, all_features)
            .await
        {
            Ok(narrative) => NarrativeOutcome::Remote(narrative),
            Err(error) => {
                let (class, transient) = error
                    .as_fetch()
                    .map(|e| (e.class(), e.is_transient()))
                    .unwrap_or(("validation", false));
                warn!(
                    decision = %decision,
                    class,
                    transient,
                    error = %error,
                    "narrative unavailable, using templated explanation"
                );
                NarrativeOutcome::Fallback {
                    narrative: render_fallback(decision, probability, &top),
                    error,
                }
            }
        }
    }
}

/// The `n` features with the largest absolute SHAP value, strongest first.
///
/// Ties keep their input order.
pub fn select_top_features(features: &[ShapFeature], n: usize) -> Vec<ShapFeature> {
    let mut sorted = features.to_vec();
    sorted.sort_by(|a, b| b.shap_value.abs().total_cmp(&a.shap_value.abs()));
    sorted.truncate(n);
    sorted
}
