use std::time::Duration;

use async_trait::async_trait;
use dinescope_core::{GeoPoint, RestaurantCandidate};

use crate::error::SourceError;

/// The region one adapter call should cover.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchQuery {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub limit: usize,
    pub category: String,
}

/// One data source normalized to the common candidate schema.
///
/// Implementations hold only injected configuration and are stateless per
/// call, so one instance can serve concurrent searches.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier reported as `source_used` and in metrics.
    fn name(&self) -> &str;

    /// Chain position; lower runs first.
    fn priority(&self) -> u16;

    /// Trust in `[0, 1]`, used to order adapters sharing a priority.
    fn confidence(&self) -> f64;

    /// Upper bound the chain enforces on one [`SourceAdapter::fetch`] call.
    fn timeout(&self) -> Duration;

    /// Fetch candidates around `query.center`.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the source cannot answer.
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<RestaurantCandidate>, SourceError>;
}
