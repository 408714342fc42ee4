//! 传输层：叙述生成后端的抽象与 HTTP 实现。
//!
//! # Transport Module
//!
//! The narrative cache talks to its backend through the [`NarrativeBackend`] trait.
//! [`HttpTransport`] is the production implementation; tests inject scripted backends.
//!
//! Failures are reported as [`FetchError`], which is `Clone` so that a single failed
//! attempt can be handed to every caller waiting on it.

mod error;
pub mod http;

pub use error::{FetchError, FetchErrorKind};
pub use http::{HttpTransport, TransportConfig};

use crate::types::{Narrative, NarrativeRequest};
use async_trait::async_trait;

/// Something that can turn a [`NarrativeRequest`] into a [`Narrative`].
#[async_trait]
pub trait NarrativeBackend: Send + Sync {
    async fn generate(
        &self,
        request: &NarrativeRequest,
    ) -> std::result::Result<Narrative, FetchError>;

    fn name(&self) -> &'static str;
}
