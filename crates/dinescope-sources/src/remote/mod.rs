//! HTTP adapter for third-party places APIs.
//!
//! One [`RemotePlacesAdapter`] is built per configured source. The vendor
//! profile decides the request shape and the field mapping; transport and
//! status classification are shared here.

mod foursquare;
mod google;

use std::time::Duration;

use async_trait::async_trait;
use dinescope_core::{PlacesVendor, RemoteSourceConfig, RestaurantCandidate};
use reqwest::{Client, RequestBuilder, StatusCode, Url};

use crate::adapter::{FetchQuery, SourceAdapter};
use crate::error::SourceError;

/// Retry hint used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

pub struct RemotePlacesAdapter {
    client: Client,
    config: RemoteSourceConfig,
    base_url: Url,
}

impl RemotePlacesAdapter {
    /// Build an adapter from a resolved source entry.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] if the base URL does not parse or
    /// the HTTP client cannot be constructed.
    pub fn new(config: RemoteSourceConfig, user_agent: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.timeout_ms.min(10_000)))
            .user_agent(user_agent)
            .build()
            .map_err(|e| SourceError::unavailable(&config.name, format!("client build: {e}")))?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", config.endpoint_base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            SourceError::unavailable(
                &config.name,
                format!("invalid base URL '{}': {e}", config.endpoint_base_url),
            )
        })?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    #[must_use]
    pub fn vendor(&self) -> PlacesVendor {
        self.config.vendor
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url.join(path).map_err(|e| {
            SourceError::unavailable(&self.config.name, format!("bad path {path}: {e}"))
        })
    }

    /// Send a request and decode the body as JSON, classifying failures.
    async fn request_json(
        &self,
        request: RequestBuilder,
    ) -> Result<serde_json::Value, SourceError> {
        let name = self.config.name.as_str();
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::unavailable(name, transport_reason(&e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(SourceError::RateLimited {
                source_name: name.to_string(),
                retry_after_secs,
            });
        }
        if !status.is_success() {
            return Err(SourceError::unavailable(name, format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::unavailable(name, transport_reason(&e)))?;
        serde_json::from_slice(&body)
            .map_err(|e| SourceError::malformed(name, format!("body is not JSON: {e}")))
    }

    fn decode<T: serde::de::DeserializeOwned>(
        &self,
        body: serde_json::Value,
    ) -> Result<T, SourceError> {
        serde_json::from_value(body).map_err(|e| {
            SourceError::malformed(
                &self.config.name,
                format!("unexpected {} response shape: {e}", self.config.vendor),
            )
        })
    }
}

#[async_trait]
impl SourceAdapter for RemotePlacesAdapter {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> u16 {
        self.config.priority
    }

    fn confidence(&self) -> f64 {
        self.config.confidence
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<RestaurantCandidate>, SourceError> {
        let candidates = match self.config.vendor {
            PlacesVendor::GooglePlaces => self.fetch_google(query).await?,
            PlacesVendor::Foursquare => self.fetch_foursquare(query).await?,
        };
        tracing::debug!(
            source = %self.config.name,
            vendor = %self.config.vendor,
            count = candidates.len(),
            radius_km = query.radius_km,
            "remote source fetched"
        );
        Ok(candidates)
    }
}

/// Radius in whole meters, clamped to what the vendor accepts.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn radius_meters(radius_km: f64, vendor_max: u32) -> u32 {
    let meters = (radius_km * 1000.0).round();
    if !meters.is_finite() || meters < 1.0 {
        return 1;
    }
    if meters >= f64::from(vendor_max) {
        return vendor_max;
    }
    meters as u32
}

fn transport_reason(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        format!("transport error: {e}")
    }
}
