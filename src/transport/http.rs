use super::{FetchError, NarrativeBackend};
use crate::types::{Narrative, NarrativeRequest, NarrativeResponse};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use std::env;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_NARRATIVE_PATH: &str = "/api/narrative";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error bodies are truncated to this many characters in [`FetchError::message`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Where and how to reach the narrative backend.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub narrative_path: String,
    pub timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            narrative_path: DEFAULT_NARRATIVE_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy_url: None,
        }
    }
}

impl TransportConfig {
    /// Defaults overridden by the environment.
    ///
    /// - `CREDIT_EXPLAIN_API_URL` (falls back to `NEXT_PUBLIC_API_URL`)
    /// - `CREDIT_EXPLAIN_NARRATIVE_PATH`
    /// - `CREDIT_EXPLAIN_HTTP_TIMEOUT_SECS`
    /// - `CREDIT_EXPLAIN_PROXY_URL`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = non_empty_var("CREDIT_EXPLAIN_API_URL")
            .or_else(|| non_empty_var("NEXT_PUBLIC_API_URL"))
            .unwrap_or(defaults.base_url);
        let narrative_path =
            non_empty_var("CREDIT_EXPLAIN_NARRATIVE_PATH").unwrap_or(defaults.narrative_path);
        let timeout = env::var("CREDIT_EXPLAIN_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let proxy_url = non_empty_var("CREDIT_EXPLAIN_PROXY_URL");

        Self {
            base_url,
            narrative_path,
            timeout,
            proxy_url,
        }
    }

    /// Full endpoint URL, validated.
    pub fn endpoint(&self) -> Result<url::Url> {
        let base = self.base_url.trim_end_matches('/');
        let path = if self.narrative_path.starts_with('/') {
            self.narrative_path.clone()
        } else {
            format!("/{}", self.narrative_path)
        };
        url::Url::parse(&format!("{}{}", base, path)).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid narrative endpoint: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone())
                    .with_source("transport"),
            )
        })
    }
}

// Blank values count as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// HTTP implementation of [`NarrativeBackend`].
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: url::Url,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let endpoint = config.endpoint()?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            match Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => warn!(proxy = %proxy_url, error = %e, "ignoring invalid proxy url"),
            }
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("failed to build HTTP client: {}", e),
                ErrorContext::new().with_source("transport"),
            )
        })?;

        Ok(Self { client, endpoint })
    }

    /// Resolved URL every request is posted to.
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait]
impl NarrativeBackend for HttpTransport {
    async fn generate(
        &self,
        request: &NarrativeRequest,
    ) -> std::result::Result<Narrative, FetchError> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-request-id", &request_id)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let mut message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            if message.trim().is_empty() {
                message = status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string();
            }
            warn!(
                request_id = %request_id,
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "narrative backend returned an error status"
            );
            return Err(FetchError::status(status.as_u16(), message));
        }

        let body = response.bytes().await?;
        let parsed: NarrativeResponse = serde_json::from_slice(&body)
            .map_err(|e| FetchError::decode(format!("invalid narrative body: {}", e)))?;

        debug!(
            request_id = %request_id,
            is_llm_generated = parsed.is_llm_generated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "narrative received"
        );
        Ok(parsed.into())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
