use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use dinescope_core::{
    SearchMetrics, SearchRequest, SearchResult, ZonedCandidate, SOURCE_SYNTHETIC,
};
use dinescope_sources::{SourceAdapter, SourceChain};
use tokio_util::sync::CancellationToken;

use crate::analytics::{self, AnalyticsSink, SearchEvent, TracingAnalyticsSink};
use crate::error::DiscoveryError;
use crate::filter::ResultFilter;
use crate::radius::RadiusController;
use crate::zones::{zone_counts, ZoneClassifier};

/// Items whose distances fall in the same band are ordered by rating.
const DISTANCE_BAND_KM: f64 = 0.1;

/// Facade over the whole search pipeline.
///
/// Holds no per-search state; one engine can serve concurrent searches.
pub struct DiscoveryEngine {
    chain: SourceChain,
    fallback: Option<SourceChain>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl DiscoveryEngine {
    /// An engine that logs search events through `tracing`.
    #[must_use]
    pub fn new(chain: SourceChain) -> Self {
        Self {
            chain,
            fallback: None,
            analytics: Arc::new(TracingAnalyticsSink),
        }
    }

    /// Last-resort source, consulted once after expansion finds nothing.
    #[must_use]
    pub fn with_fallback(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.fallback = Some(SourceChain::new(vec![adapter]));
        self
    }

    #[must_use]
    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = sink;
        self
    }

    #[must_use]
    pub fn chain(&self) -> &SourceChain {
        &self.chain
    }

    #[must_use]
    pub fn fallback(&self) -> Option<&SourceChain> {
        self.fallback.as_ref()
    }

    /// Run one search to completion.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidRequest`] if the request fails
    /// validation. An empty result is not an error.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, DiscoveryError> {
        self.search_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Run one search that stops as soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidRequest`] for a bad request and
    /// [`DiscoveryError::Cancelled`] if cancelled before completion.
    pub async fn search_with_cancel(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, DiscoveryError> {
        let started = Instant::now();
        request.validate()?;

        let expansion = RadiusController::new(&self.chain)
            .with_fallback(self.fallback.as_ref())
            .run(request, cancel)
            .await?;

        let classifier =
            ZoneClassifier::new(request.center, expansion.final_radius_km, request.buffer_km);
        let zoned = classifier.classify(expansion.candidates);
        let zone_counts = zone_counts(&zoned);

        let mut filtered = ResultFilter::new(&request.filters).apply(zoned);
        sort_items(&mut filtered);
        let total = filtered.len();
        let items: Vec<ZonedCandidate> = filtered
            .into_iter()
            .skip(request.page_offset)
            .take(request.page_limit)
            .collect();

        let attempts_made = u32::try_from(expansion.attempts.len()).unwrap_or(u32::MAX);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let is_synthetic = expansion.source_used == SOURCE_SYNTHETIC;

        let result = SearchResult {
            items,
            total,
            zone_counts,
            source_used: expansion.source_used,
            is_synthetic,
            metrics: SearchMetrics {
                attempts_made,
                final_radius_km: expansion.final_radius_km,
                expansion_factor: expansion.expansion_factor,
                elapsed_ms,
                sources_tried: expansion.sources_tried,
                attempts: expansion.attempts,
            },
        };

        tracing::info!(
            latitude = request.center.latitude(),
            longitude = request.center.longitude(),
            attempts = attempts_made,
            final_radius_km = result.metrics.final_radius_km,
            total,
            returned = result.items.len(),
            source = %result.source_used,
            is_synthetic,
            elapsed_ms,
            "search completed"
        );

        analytics::dispatch(
            Arc::clone(&self.analytics),
            SearchEvent::from_search(request, &result),
        );

        Ok(result)
    }
}

/// Distance ascending in 0.1 km bands, rating descending within a band.
/// The band key keeps this a total order.
fn sort_items(items: &mut [ZonedCandidate]) {
    items.sort_by(compare_items);
}

fn compare_items(a: &ZonedCandidate, b: &ZonedCandidate) -> Ordering {
    distance_band(a.distance_km)
        .total_cmp(&distance_band(b.distance_km))
        .then_with(|| b.candidate.rating.total_cmp(&a.candidate.rating))
        .then_with(|| a.distance_km.total_cmp(&b.distance_km))
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

fn distance_band(distance_km: f64) -> f64 {
    (distance_km / DISTANCE_BAND_KM).floor()
}
