use crate::cache::{FingerprintGenerator, NarrativeCache};
use crate::client::core::ExplainClient;
use crate::transport::{HttpTransport, NarrativeBackend, TransportConfig};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TOP_N: usize = 5;

/// Builder for creating clients with custom configuration.
///
/// Unset values come from the environment (see [`TransportConfig::from_env`] and
/// `CREDIT_EXPLAIN_TOP_N`), then from defaults.
pub struct ExplainClientBuilder {
    base_url_override: Option<String>,
    narrative_path: Option<String>,
    timeout: Option<Duration>,
    top_n: Option<usize>,
    keys: FingerprintGenerator,
    backend: Option<Arc<dyn NarrativeBackend>>,
}

impl ExplainClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url_override: None,
            narrative_path: None,
            timeout: None,
            top_n: None,
            keys: FingerprintGenerator::new(),
            backend: None,
        }
    }

    /// Override the backend base URL (mock servers, staging).
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn narrative_path(mut self, path: impl Into<String>) -> Self {
        self.narrative_path = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Number of features, by absolute SHAP value, sent with each request.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n.max(1));
        self
    }

    /// Decimal places of the probability that take part in the cache key.
    pub fn probability_precision(mut self, precision: usize) -> Self {
        self.keys = self.keys.with_precision(precision);
        self
    }

    /// Inject a backend instead of the HTTP transport.
    pub fn with_backend(mut self, backend: Arc<dyn NarrativeBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Build the client. Each call creates a fresh, empty cache.
    pub fn build(self) -> Result<ExplainClient> {
        let backend = match self.backend {
            Some(backend) => backend,
            None => {
                let mut config = TransportConfig::from_env();
                if let Some(url) = self.base_url_override {
                    config.base_url = url;
                }
                if let Some(path) = self.narrative_path {
                    config.narrative_path = path;
                }
                if let Some(timeout) = self.timeout {
                    config.timeout = timeout;
                }
                let transport = HttpTransport::new(&config)?;
                debug!(
                    endpoint = %transport.endpoint(),
                    timeout_secs = config.timeout.as_secs(),
                    "narrative transport ready"
                );
                Arc::new(transport) as Arc<dyn NarrativeBackend>
            }
        };

        let top_n = self
            .top_n
            .or_else(|| {
                std::env::var("CREDIT_EXPLAIN_TOP_N")
                    .ok()?
                    .parse::<usize>()
                    .ok()
            })
            .unwrap_or(DEFAULT_TOP_N)
            .max(1);

        Ok(ExplainClient {
            cache: NarrativeCache::with_generator(backend, self.keys),
            top_n,
        })
    }
}

impl Default for ExplainClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
