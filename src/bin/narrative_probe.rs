//! narrative-probe — send a narrative request to the explanation backend and show the cache at work
//!
//! Usage:
//!   narrative-probe <request.json> [--base-url <url>] [--top-n <n>]
//!
//! The request file has the backend's request shape:
//!   {"decision": "rejected", "probability": 0.73, "shap_features": [...], "all_features": {...}}

use anyhow::{bail, Context, Result};
use credit_explain::types::NarrativeRequest;
use credit_explain::{ExplainClient, NarrativeOutcome};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!(
        r#"narrative-probe — request a narrative twice and report cache behaviour

USAGE:
    narrative-probe <request.json> [OPTIONS]

OPTIONS:
    --base-url <url>    Backend base URL (overrides CREDIT_EXPLAIN_API_URL)
    --top-n <n>         Number of features sent (overrides CREDIT_EXPLAIN_TOP_N)
    -h, --help          Show this help message

ENVIRONMENT:
    CREDIT_EXPLAIN_API_URL, NEXT_PUBLIC_API_URL, CREDIT_EXPLAIN_HTTP_TIMEOUT_SECS,
    RUST_LOG (e.g. credit_explain=debug)"#
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn report(round: usize, outcome: NarrativeOutcome) {
    let source = match &outcome {
        NarrativeOutcome::Remote(n) if n.is_generated => "backend (generated)",
        NarrativeOutcome::Remote(_) => "backend (template)",
        NarrativeOutcome::Fallback { .. } => "local fallback",
    };
    println!("[{}] source: {}", round, source);
    if let NarrativeOutcome::Fallback { error, .. } = &outcome {
        println!("[{}] error: {}", round, error);
    }
    println!("[{}] {}", round, outcome.into_narrative().narrative);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }
    let Some(path) = args.first().filter(|a| !a.starts_with("--")) else {
        print_usage();
        bail!("missing request file");
    };

    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let request: NarrativeRequest =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))?;

    let mut builder = ExplainClient::builder();
    if let Some(url) = flag_value(&args, "--base-url") {
        builder = builder.base_url_override(url);
    }
    if let Some(n) = flag_value(&args, "--top-n") {
        builder = builder.top_n(n.parse().context("--top-n must be a number")?);
    }
    let client = builder.build()?;

    for round in 1..=2 {
        let outcome = client
            .explain(
                request.decision,
                request.probability,
                &request.shap_features,
                &request.all_features,
            )
            .await;
        report(round, outcome);
    }

    let stats = client.cache().stats();
    println!(
        "cache: {} stored, {} hits, {} fetches, {} failures (hit ratio {:.2})",
        client.cache().len(),
        stats.hits,
        stats.fetches,
        stats.failures,
        stats.hit_ratio()
    );
    Ok(())
}
