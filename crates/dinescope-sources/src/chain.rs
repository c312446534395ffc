//! Priority fallback across configured adapters.
//!
//! Adapters run sequentially, highest priority first. The first adapter that
//! answers with at least one candidate wins and no later adapter is called.
//! Errors and timeouts are logged and skipped. If nothing answers, the chain
//! returns an empty outcome tagged [`SOURCE_NONE`].

use std::sync::Arc;

use dinescope_core::{RestaurantCandidate, SOURCE_NONE};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::adapter::{FetchQuery, SourceAdapter};
use crate::error::SourceError;

/// The caller cancelled while the chain was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("source chain cancelled")]
pub struct ChainCancelled;

/// Record of one adapter invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTrial {
    pub name: String,
    pub result_count: usize,
    pub succeeded: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    pub candidates: Vec<RestaurantCandidate>,
    pub source_used: String,
    /// Every adapter invoked, in call order.
    pub tried: Vec<SourceTrial>,
}

pub struct SourceChain {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl SourceChain {
    /// Build a chain ordered by `(priority asc, confidence desc)`.
    ///
    /// The sort is stable, so adapters tying on both keep insertion order.
    #[must_use]
    pub fn new(mut adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        adapters.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| b.confidence().total_cmp(&a.confidence()))
        });
        Self { adapters }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Adapter names in execution order.
    #[must_use]
    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Run the fallback policy for one region.
    ///
    /// Each adapter call is bounded by its own timeout and raced against
    /// `cancel`; on cancellation the in-flight call is dropped, which aborts
    /// its underlying request.
    ///
    /// # Errors
    ///
    /// Returns [`ChainCancelled`] if `cancel` fires before the chain settles.
    pub async fn fetch(
        &self,
        query: &FetchQuery,
        cancel: &CancellationToken,
    ) -> Result<ChainOutcome, ChainCancelled> {
        let mut tried = Vec::with_capacity(self.adapters.len());

        for adapter in &self.adapters {
            if cancel.is_cancelled() {
                return Err(ChainCancelled);
            }

            let name = adapter.name();
            let timeout = adapter.timeout();
            let call = tokio::time::timeout(timeout, adapter.fetch(query));

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ChainCancelled),
                outcome = call => outcome.unwrap_or_else(|_| {
                    Err(SourceError::Unavailable {
                        source_name: name.to_string(),
                        reason: format!("timed out after {}ms", timeout.as_millis()),
                    })
                }),
            };

            match result {
                Ok(mut candidates) if !candidates.is_empty() => {
                    candidates.truncate(query.limit);
                    tracing::debug!(
                        source = name,
                        count = candidates.len(),
                        radius_km = query.radius_km,
                        "source chain selected source"
                    );
                    tried.push(SourceTrial {
                        name: name.to_string(),
                        result_count: candidates.len(),
                        succeeded: true,
                        error: None,
                    });
                    return Ok(ChainOutcome {
                        candidates,
                        source_used: name.to_string(),
                        tried,
                    });
                }
                Ok(_) => {
                    tracing::debug!(
                        source = name,
                        radius_km = query.radius_km,
                        "source returned no candidates; falling back"
                    );
                    tried.push(SourceTrial {
                        name: name.to_string(),
                        result_count: 0,
                        succeeded: true,
                        error: None,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        source = name,
                        kind = e.kind(),
                        error = %e,
                        "source failed; falling back"
                    );
                    tried.push(SourceTrial {
                        name: name.to_string(),
                        result_count: 0,
                        succeeded: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(ChainOutcome {
            candidates: Vec::new(),
            source_used: SOURCE_NONE.to_string(),
            tried,
        })
    }
}
