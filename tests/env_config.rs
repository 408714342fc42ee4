//! Environment-driven configuration. Every test mutates process env through
//! `temp_env`, which serializes them, so they live in their own test binary.

use credit_explain::transport::{HttpTransport, TransportConfig};
use credit_explain::{Decision, ExplainClient, FeatureContext, FeatureValue, ShapFeature};
use mockito::Server;
use std::time::Duration;

const VARS: [&str; 6] = [
    "CREDIT_EXPLAIN_API_URL",
    "NEXT_PUBLIC_API_URL",
    "CREDIT_EXPLAIN_NARRATIVE_PATH",
    "CREDIT_EXPLAIN_HTTP_TIMEOUT_SECS",
    "CREDIT_EXPLAIN_PROXY_URL",
    "CREDIT_EXPLAIN_TOP_N",
];

/// Runs `f` with only the given variables set; the rest of [`VARS`] are cleared.
fn with_env<R>(set: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
    let vars: Vec<(&str, Option<&str>)> = VARS
        .iter()
        .map(|name| {
            let value = set.iter().find(|(k, _)| k == name).map(|(_, v)| *v);
            (*name, value)
        })
        .collect();
    temp_env::with_vars(vars, f)
}

#[test]
fn defaults_apply_without_env() {
    let cfg = with_env(&[], TransportConfig::from_env);
    assert_eq!(cfg.base_url, "http://localhost:8000");
    assert_eq!(cfg.narrative_path, "/api/narrative");
    assert_eq!(cfg.timeout, Duration::from_secs(30));
    assert!(cfg.proxy_url.is_none());
}

#[test]
fn primary_url_wins_over_public_fallback() {
    let cfg = with_env(
        &[
            ("CREDIT_EXPLAIN_API_URL", "http://primary:8000"),
            ("NEXT_PUBLIC_API_URL", "http://public:8000"),
        ],
        TransportConfig::from_env,
    );
    assert_eq!(cfg.base_url, "http://primary:8000");
}

#[test]
fn blank_primary_url_falls_through_to_public_url() {
    let cfg = with_env(
        &[
            ("CREDIT_EXPLAIN_API_URL", "   "),
            ("NEXT_PUBLIC_API_URL", "http://public:8000"),
        ],
        TransportConfig::from_env,
    );
    assert_eq!(cfg.base_url, "http://public:8000");

    let cfg = with_env(&[("CREDIT_EXPLAIN_API_URL", "")], TransportConfig::from_env);
    assert_eq!(cfg.base_url, "http://localhost:8000");
}

#[test]
fn path_timeout_and_proxy_come_from_env() {
    let cfg = with_env(
        &[
            ("CREDIT_EXPLAIN_NARRATIVE_PATH", "v2/narrative"),
            ("CREDIT_EXPLAIN_HTTP_TIMEOUT_SECS", "5"),
            ("CREDIT_EXPLAIN_PROXY_URL", ""),
        ],
        TransportConfig::from_env,
    );
    assert_eq!(cfg.timeout, Duration::from_secs(5));
    assert!(cfg.proxy_url.is_none());

    let transport = HttpTransport::new(&cfg).unwrap();
    assert_eq!(
        transport.endpoint().as_str(),
        "http://localhost:8000/v2/narrative"
    );
}

#[test]
fn unusable_timeout_keeps_default() {
    for raw in ["0", "soon"] {
        let cfg = with_env(
            &[("CREDIT_EXPLAIN_HTTP_TIMEOUT_SECS", raw)],
            TransportConfig::from_env,
        );
        assert_eq!(cfg.timeout, Duration::from_secs(30), "{}", raw);
    }
}

#[tokio::test]
async fn builder_overrides_beat_env() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/custom/narrative")
        .with_status(200)
        .with_body(r#"{"narrative":"Declined.","is_llm_generated":false}"#)
        .expect(1)
        .create_async()
        .await;

    let client = with_env(
        &[
            ("CREDIT_EXPLAIN_API_URL", "http://unreachable.invalid:1"),
            ("CREDIT_EXPLAIN_NARRATIVE_PATH", "/wrong"),
            ("CREDIT_EXPLAIN_TOP_N", "9"),
        ],
        || {
            ExplainClient::builder()
                .base_url_override(server.url())
                .narrative_path("/custom/narrative")
                .top_n(2)
                .build()
        },
    )
    .unwrap();
    assert_eq!(client.top_n(), 2);

    let features = vec![ShapFeature::new(
        "duration",
        FeatureValue::Number(48.0),
        0.22,
    )];
    let narrative = client
        .narrative(Decision::Rejected, 0.7, &features, &FeatureContext::new())
        .await
        .unwrap();
    assert_eq!(narrative.narrative, "Declined.");
    mock.assert_async().await;
}

#[test]
fn top_n_is_read_from_env_when_unset() {
    let client = with_env(&[("CREDIT_EXPLAIN_TOP_N", "3")], || {
        ExplainClient::builder().build()
    })
    .unwrap();
    assert_eq!(client.top_n(), 3);
}
