//! Narrative cache with single-flight request coalescing.

use super::key::{FingerprintGenerator, RequestFingerprint};
use super::store::CompletedStore;
use crate::transport::{FetchError, NarrativeBackend};
use crate::types::{Decision, FeatureContext, Narrative, NarrativeRequest, ShapFeature};
use crate::{Error, ErrorContext, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::{debug, warn};

type AttemptOutput = std::result::Result<Narrative, FetchError>;
type SharedAttempt = Shared<BoxFuture<'static, AttemptOutput>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Served from the completed store.
    pub hits: u64,
    /// Attached to an attempt another caller started.
    pub coalesced: u64,
    /// Backend calls issued.
    pub fetches: u64,
    /// Backend calls that failed.
    pub failures: u64,
    /// Waiters that re-attempted after a shared attempt failed.
    pub retries: u64,
}

impl CacheStats {
    /// Fraction of lookups that did not need a backend call of their own.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.coalesced + self.fetches;
        if total == 0 {
            0.0
        } else {
            (self.hits + self.coalesced) as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    coalesced: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
    retries: AtomicU64,
}

impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        }
    }

    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

struct InFlight {
    id: u64,
    attempt: SharedAttempt,
}

#[derive(Default)]
struct State {
    completed: CompletedStore,
    inflight: HashMap<RequestFingerprint, InFlight>,
    next_attempt_id: u64,
}

struct Inner {
    backend: Arc<dyn NarrativeBackend>,
    keys: FingerprintGenerator,
    state: Mutex<State>,
    stats: AtomicStats,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        // State is only mutated with plain map operations; a panic elsewhere leaves it consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes an attempt's in-flight entry when the attempt task ends, however it ends.
struct InFlightCleanup {
    inner: Arc<Inner>,
    fingerprint: RequestFingerprint,
    attempt_id: u64,
}

impl Drop for InFlightCleanup {
    fn drop(&mut self) {
        let mut state = self.inner.state();
        if state
            .inflight
            .get(&self.fingerprint)
            .is_some_and(|f| f.id == self.attempt_id)
        {
            state.inflight.remove(&self.fingerprint);
        }
    }
}

enum Lookup {
    Hit(Narrative),
    Join(SharedAttempt),
    Started(SharedAttempt),
}

/// Process-lifetime narrative cache.
///
/// - At most one backend call is outstanding per [`RequestFingerprint`].
/// - A completed narrative is stored once and never overwritten.
/// - Failures are never stored; the next identical call goes to the backend again.
///
/// Each backend call runs as a detached tokio task, so dropping the calling future does
/// not cancel it and its result still lands in the cache. Cloning the cache shares state.
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct NarrativeCache {
    inner: Arc<Inner>,
}

impl NarrativeCache {
    pub fn new(backend: Arc<dyn NarrativeBackend>) -> Self {
        Self::with_generator(backend, FingerprintGenerator::new())
    }

    pub fn with_generator(backend: Arc<dyn NarrativeBackend>, keys: FingerprintGenerator) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                keys,
                state: Mutex::new(State::default()),
                stats: AtomicStats::new(),
            }),
        }
    }

    pub fn fingerprint(
        &self,
        decision: Decision,
        probability: f64,
        top_features: &[ShapFeature],
    ) -> Result<RequestFingerprint> {
        self.inner.keys.generate(decision, probability, top_features)
    }

    /// Narrative for `(decision, probability, top_features)`.
    ///
    /// `all_features` is sent to the backend as context but is not part of the key.
    /// A caller that attached to someone else's attempt re-attempts once if that attempt
    /// fails; the caller that started an attempt gets its failure as is.
    pub async fn get_narrative(
        &self,
        decision: Decision,
        probability: f64,
        top_features: &[ShapFeature],
        all_features: &FeatureContext,
    ) -> Result<Narrative> {
        let fingerprint = self.fingerprint(decision, probability, top_features)?;
        // attempts run detached, so a runtime must exist before anything is registered
        let runtime = Handle::try_current().map_err(|e| {
            Error::configuration_with_context(
                "narrative requests need a running tokio runtime",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("narrative_cache"),
            )
        })?;
        let make_request = || NarrativeRequest {
            decision,
            probability,
            shap_features: top_features.to_vec(),
            all_features: all_features.clone(),
        };

        let mut retried = false;
        loop {
            match self.lookup(&runtime, &fingerprint, &make_request) {
                Lookup::Hit(narrative) => return Ok(narrative),
                Lookup::Started(attempt) => return attempt.await.map_err(Error::from),
                Lookup::Join(attempt) => match attempt.await {
                    Ok(narrative) => return Ok(narrative),
                    Err(e) if !retried => {
                        retried = true;
                        self.inner.stats.retries.fetch_add(1, Ordering::Relaxed);
                        debug!(
                            fingerprint = fingerprint.short(),
                            error = %e,
                            "shared narrative attempt failed, re-attempting"
                        );
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }
    }

    /// Completed narrative for a fingerprint, without touching the backend.
    pub fn cached(&self, fingerprint: &RequestFingerprint) -> Option<Narrative> {
        self.inner.state().completed.get(fingerprint).cloned()
    }

    pub fn is_inflight(&self, fingerprint: &RequestFingerprint) -> bool {
        self.inner.state().inflight.contains_key(fingerprint)
    }

    /// Number of completed narratives.
    pub fn len(&self) -> usize {
        self.inner.state().completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inflight_len(&self) -> usize {
        self.inner.state().inflight.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.backend.name()
    }

    fn lookup(
        &self,
        runtime: &Handle,
        fingerprint: &RequestFingerprint,
        make_request: &impl Fn() -> NarrativeRequest,
    ) -> Lookup {
        let mut state = self.inner.state();

        if let Some(narrative) = state.completed.get(fingerprint) {
            self.inner.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!(fingerprint = fingerprint.short(), "narrative cache hit");
            return Lookup::Hit(narrative.clone());
        }

        if let Some(flight) = state.inflight.get(fingerprint) {
            self.inner.stats.coalesced.fetch_add(1, Ordering::Relaxed);
            debug!(fingerprint = fingerprint.short(), "joining in-flight narrative request");
            return Lookup::Join(flight.attempt.clone());
        }

        let attempt_id = state.next_attempt_id;
        state.next_attempt_id += 1;
        let attempt = self.spawn_attempt(runtime, fingerprint.clone(), attempt_id, make_request());
        state.inflight.insert(
            fingerprint.clone(),
            InFlight {
                id: attempt_id,
                attempt: attempt.clone(),
            },
        );
        Lookup::Started(attempt)
    }

    /// Runs the backend call on its own task. The task publishes a success to the
    /// store and clears the in-flight entry before its output becomes visible.
    fn spawn_attempt(
        &self,
        runtime: &Handle,
        fingerprint: RequestFingerprint,
        attempt_id: u64,
        request: NarrativeRequest,
    ) -> SharedAttempt {
        let inner = Arc::clone(&self.inner);
        inner.stats.fetches.fetch_add(1, Ordering::Relaxed);
        debug!(
            fingerprint = fingerprint.short(),
            attempt_id,
            backend = inner.backend.name(),
            "issuing narrative request"
        );

        let handle = runtime.spawn(async move {
            let _cleanup = InFlightCleanup {
                inner: Arc::clone(&inner),
                fingerprint: fingerprint.clone(),
                attempt_id,
            };
            let started = Instant::now();
            let outcome = inner.backend.generate(&request).await;
            match &outcome {
                Ok(narrative) => {
                    let stored = inner
                        .state()
                        .completed
                        .insert_once(fingerprint.clone(), narrative.clone());
                    debug!(
                        fingerprint = fingerprint.short(),
                        stored,
                        is_generated = narrative.is_generated,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "narrative request completed"
                    );
                }
                Err(e) => {
                    inner.stats.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        fingerprint = fingerprint.short(),
                        class = e.class(),
                        error = %e,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "narrative request failed"
                    );
                }
            }
            outcome
        });

        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(FetchError::aborted(format!("narrative attempt ended: {}", e))),
            }
        }
        .boxed()
        .shared()
    }
}
