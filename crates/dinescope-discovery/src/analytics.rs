//! Fire-and-forget search events.
//!
//! Events carry aggregate, non-identifying fields only. Delivery runs on a
//! spawned task; a failing sink is logged and never reaches the search caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dinescope_core::{ResultFilterSpec, SearchRequest, SearchResult};
use reqwest::{Client, Url};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("invalid analytics URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("analytics HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analytics endpoint returned HTTP {0}")]
    Status(u16),
}

/// One completed search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEvent {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub initial_radius_km: f64,
    pub final_radius_km: f64,
    pub filters: ResultFilterSpec,
    /// Filtered matches before pagination.
    pub result_count: usize,
    pub source_used: String,
    pub is_synthetic: bool,
    pub attempts_made: u32,
    pub elapsed_ms: u64,
}

impl SearchEvent {
    #[must_use]
    pub fn from_search(request: &SearchRequest, result: &SearchResult) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            latitude: request.center.latitude(),
            longitude: request.center.longitude(),
            initial_radius_km: request.initial_radius_km,
            final_radius_km: result.metrics.final_radius_km,
            filters: request.filters.clone(),
            result_count: result.total,
            source_used: result.source_used.clone(),
            is_synthetic: result.is_synthetic,
            attempts_made: result.metrics.attempts_made,
            elapsed_ms: result.metrics.elapsed_ms,
        }
    }
}

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Returns an [`AnalyticsError`] when delivery fails; callers log and drop it.
    async fn record(&self, event: &SearchEvent) -> Result<(), AnalyticsError>;
}

/// Writes events to the `dinescope::analytics` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalyticsSink;

#[async_trait]
impl AnalyticsSink for TracingAnalyticsSink {
    async fn record(&self, event: &SearchEvent) -> Result<(), AnalyticsError> {
        tracing::info!(
            target: "dinescope::analytics",
            event_id = %event.event_id,
            latitude = event.latitude,
            longitude = event.longitude,
            final_radius_km = event.final_radius_km,
            result_count = event.result_count,
            source_used = %event.source_used,
            is_synthetic = event.is_synthetic,
            attempts_made = event.attempts_made,
            elapsed_ms = event.elapsed_ms,
            "search event"
        );
        Ok(())
    }
}

/// POSTs each event as JSON to a collector endpoint.
pub struct HttpAnalyticsSink {
    client: Client,
    url: Url,
}

impl HttpAnalyticsSink {
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidUrl`] for an unparseable URL or
    /// [`AnalyticsError::Http`] if the client cannot be built.
    pub fn new(url: &str, timeout: Duration, user_agent: &str) -> Result<Self, AnalyticsError> {
        let parsed = Url::parse(url).map_err(|e| AnalyticsError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: parsed,
        })
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    async fn record(&self, event: &SearchEvent) -> Result<(), AnalyticsError> {
        let response = self.client.post(self.url.clone()).json(event).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalyticsError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Hand `event` to `sink` without waiting for delivery.
///
/// Outside a Tokio runtime the event is dropped with a warning.
pub fn dispatch(sink: Arc<dyn AnalyticsSink>, event: SearchEvent) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(event_id = %event.event_id, "no runtime; analytics event dropped");
        return;
    };
    handle.spawn(async move {
        if let Err(e) = sink.record(&event).await {
            tracing::warn!(event_id = %event.event_id, error = %e, "analytics delivery failed");
        }
    });
}
