//! Explanation client for credit decisions.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
pub(crate) mod error_classification;

pub use builder::ExplainClientBuilder;
pub use core::{select_top_features, ExplainClient, NarrativeOutcome};
