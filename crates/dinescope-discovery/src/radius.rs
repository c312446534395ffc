//! Adaptive radius expansion.
//!
//! The controller is a small state machine:
//! `Searching(attempt, r) -> Expanding -> Searching(attempt + 1, r') -> Done`.
//! Each `Searching` step runs the source chain once. The radius never shrinks
//! and never exceeds the request's maximum.

use dinescope_core::{
    AttemptRecord, RestaurantCandidate, SearchRequest, SourceAttempt, SOURCE_NONE,
};
use dinescope_sources::{ChainCancelled, FetchQuery, SourceChain};
use tokio_util::sync::CancellationToken;

/// Growth when an attempt found at most [`SPARSE_MAX`] candidates.
pub const SPARSE_FACTOR: f64 = 2.0;
pub const STEADY_FACTOR: f64 = 1.4;
pub const SPARSE_MAX: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadiusState {
    Searching {
        attempt: u32,
        radius_km: f64,
    },
    Expanding {
        attempt: u32,
        from_km: f64,
        to_km: f64,
        factor: f64,
    },
    Done,
    /// Only reachable with `max_attempts == 0` or `max < initial`, both of
    /// which request validation rejects.
    Exhausted,
}

/// Bounds that decide when expansion stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionLimits {
    pub min_result_count: usize,
    pub max_attempts: u32,
    pub max_radius_km: f64,
}

impl ExpansionLimits {
    #[must_use]
    pub fn from_request(request: &SearchRequest) -> Self {
        Self {
            min_result_count: request.min_result_count,
            max_attempts: request.max_attempts,
            max_radius_km: request.max_radius_km,
        }
    }
}

#[must_use]
pub fn expansion_factor(found: usize) -> f64 {
    if found <= SPARSE_MAX {
        SPARSE_FACTOR
    } else {
        STEADY_FACTOR
    }
}

/// The state following a completed `Searching(attempt, radius_km)` step.
#[must_use]
pub fn transition(
    attempt: u32,
    radius_km: f64,
    found: usize,
    limits: ExpansionLimits,
) -> RadiusState {
    if found >= limits.min_result_count
        || attempt >= limits.max_attempts
        || radius_km >= limits.max_radius_km
    {
        return RadiusState::Done;
    }
    let factor = expansion_factor(found);
    RadiusState::Expanding {
        attempt,
        from_km: radius_km,
        to_km: (radius_km * factor).min(limits.max_radius_km),
        factor,
    }
}

/// Everything the engine needs from a finished expansion loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionOutcome {
    /// Candidates from the final attempt only.
    pub candidates: Vec<RestaurantCandidate>,
    pub source_used: String,
    pub final_radius_km: f64,
    /// Last factor applied; `1.0` when no expansion happened.
    pub expansion_factor: f64,
    pub attempts: Vec<AttemptRecord>,
    pub sources_tried: Vec<SourceAttempt>,
}

pub struct RadiusController<'a> {
    chain: &'a SourceChain,
    fallback: Option<&'a SourceChain>,
}

impl<'a> RadiusController<'a> {
    #[must_use]
    pub fn new(chain: &'a SourceChain) -> Self {
        Self {
            chain,
            fallback: None,
        }
    }

    /// Consult `fallback` once, at the final radius, only when every attempt
    /// ended with no source answering. It never takes part in expansion.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Option<&'a SourceChain>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Drive the expansion loop until it settles.
    ///
    /// A failed or empty source is never retried within the same attempt;
    /// the next attempt widens the radius instead.
    ///
    /// # Errors
    ///
    /// Returns [`ChainCancelled`] if `cancel` fires; no further attempts run.
    pub async fn run(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<ExpansionOutcome, ChainCancelled> {
        let limits = ExpansionLimits::from_request(request);
        let mut outcome = ExpansionOutcome {
            candidates: Vec::new(),
            source_used: SOURCE_NONE.to_string(),
            final_radius_km: request.initial_radius_km,
            expansion_factor: 1.0,
            attempts: Vec::new(),
            sources_tried: Vec::new(),
        };

        let unsearchable =
            limits.max_attempts == 0 || limits.max_radius_km < request.initial_radius_km;
        let mut state = if unsearchable {
            RadiusState::Exhausted
        } else {
            RadiusState::Searching {
                attempt: 1,
                radius_km: request.initial_radius_km,
            }
        };

        loop {
            match state {
                RadiusState::Searching { attempt, radius_km } => {
                    if cancel.is_cancelled() {
                        return Err(ChainCancelled);
                    }

                    let query = FetchQuery {
                        center: request.center,
                        radius_km,
                        limit: request.fetch_limit,
                        category: request.category.clone(),
                    };
                    let fetched = self.chain.fetch(&query, cancel).await?;
                    let found = fetched.candidates.len();

                    tracing::debug!(
                        attempt,
                        radius_km,
                        count = found,
                        source = %fetched.source_used,
                        "radius attempt finished"
                    );

                    outcome
                        .sources_tried
                        .extend(fetched.tried.into_iter().map(|t| SourceAttempt {
                            attempt,
                            name: t.name,
                            result_count: t.result_count,
                            succeeded: t.succeeded,
                            error: t.error,
                        }));
                    outcome.attempts.push(AttemptRecord {
                        attempt,
                        radius_km,
                        candidate_count: found,
                        source_used: fetched.source_used.clone(),
                    });
                    outcome.candidates = fetched.candidates;
                    outcome.source_used = fetched.source_used;
                    outcome.final_radius_km = radius_km;

                    state = transition(attempt, radius_km, found, limits);
                }
                RadiusState::Expanding {
                    attempt,
                    from_km,
                    to_km,
                    factor,
                } => {
                    tracing::debug!(attempt, from_km, to_km, factor, "expanding search radius");
                    outcome.expansion_factor = factor;
                    state = RadiusState::Searching {
                        attempt: attempt + 1,
                        radius_km: to_km,
                    };
                }
                RadiusState::Done => {
                    if outcome.source_used == SOURCE_NONE {
                        if let Some(fallback) = self.fallback {
                            Self::run_fallback(fallback, request, cancel, &mut outcome)
                                .await?;
                        }
                    }
                    return Ok(outcome);
                }
                RadiusState::Exhausted => {
                    tracing::warn!(
                        max_attempts = limits.max_attempts,
                        max_radius_km = limits.max_radius_km,
                        "radius controller exhausted before the first attempt"
                    );
                    return Ok(outcome);
                }
            }
        }
    }
}

impl RadiusController<'_> {
    async fn run_fallback(
        fallback: &SourceChain,
        request: &SearchRequest,
        cancel: &CancellationToken,
        outcome: &mut ExpansionOutcome,
    ) -> Result<(), ChainCancelled> {
        let query = FetchQuery {
            center: request.center,
            radius_km: outcome.final_radius_km,
            limit: request.fetch_limit,
            category: request.category.clone(),
        };
        let fetched = fallback.fetch(&query, cancel).await?;
        let attempt = outcome.attempts.last().map_or(0, |a| a.attempt);

        tracing::info!(
            attempt,
            radius_km = query.radius_km,
            count = fetched.candidates.len(),
            source = %fetched.source_used,
            "no source answered; consulted fallback"
        );

        outcome
            .sources_tried
            .extend(fetched.tried.into_iter().map(|t| SourceAttempt {
                attempt,
                name: t.name,
                result_count: t.result_count,
                succeeded: t.succeeded,
                error: t.error,
            }));
        if fetched.candidates.is_empty() {
            return Ok(());
        }
        if let Some(last) = outcome.attempts.last_mut() {
            last.candidate_count = fetched.candidates.len();
            last.source_used.clone_from(&fetched.source_used);
        }
        outcome.candidates = fetched.candidates;
        outcome.source_used = fetched.source_used;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ExpansionLimits {
        ExpansionLimits {
            min_result_count: 5,
            max_attempts: 4,
            max_radius_km: 15.0,
        }
    }

    #[test]
    fn sparse_results_double_the_radius() {
        assert_eq!(
            transition(1, 2.0, 1, limits()),
            RadiusState::Expanding {
                attempt: 1,
                from_km: 2.0,
                to_km: 4.0,
                factor: SPARSE_FACTOR,
            }
        );
    }

    #[test]
    fn two_results_still_count_as_sparse() {
        let RadiusState::Expanding { to_km, .. } = transition(1, 2.0, 2, limits()) else {
            panic!("expected expansion");
        };
        assert_eq!(to_km, 4.0);
    }

    #[test]
    fn three_or_more_results_use_steady_factor() {
        let RadiusState::Expanding { to_km, factor, .. } = transition(1, 2.0, 3, limits()) else {
            panic!("expected expansion");
        };
        assert_eq!(factor, STEADY_FACTOR);
        assert!((to_km - 2.8).abs() < 1e-9);
    }

    #[test]
    fn enough_results_finish() {
        assert_eq!(transition(1, 2.0, 5, limits()), RadiusState::Done);
    }

    #[test]
    fn last_attempt_finishes_even_when_sparse() {
        assert_eq!(transition(4, 8.0, 0, limits()), RadiusState::Done);
    }

    #[test]
    fn max_radius_finishes() {
        assert_eq!(transition(2, 15.0, 0, limits()), RadiusState::Done);
    }

    #[test]
    fn expansion_is_capped_at_max_radius() {
        let RadiusState::Expanding { to_km, .. } = transition(2, 10.0, 0, limits()) else {
            panic!("expected expansion");
        };
        assert_eq!(to_km, 15.0);
    }

    #[test]
    fn radius_sequence_is_monotonic_and_bounded() {
        let l = limits();
        let mut radius = 0.5;
        for attempt in 1..=l.max_attempts {
            match transition(attempt, radius, 0, l) {
                RadiusState::Expanding { from_km, to_km, .. } => {
                    assert!(to_km >= from_km);
                    assert!(to_km <= l.max_radius_km);
                    radius = to_km;
                }
                RadiusState::Done => break,
                other => panic!("unexpected state {other:?}"),
            }
        }
    }
}
