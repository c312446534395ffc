//! Candidate, zone, and result types shared by every engine stage.

use serde::Serialize;

use crate::geo::GeoPoint;

/// `source_used` when no adapter produced anything.
pub const SOURCE_NONE: &str = "none";
/// `source_used` (and `source_name`) for generated placeholder data.
pub const SOURCE_SYNTHETIC: &str = "synthetic";

/// A restaurant normalized from any data source.
///
/// `id` is unique within `source_name` only; two sources may describe the
/// same physical restaurant under different ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantCandidate {
    pub id: String,
    pub name: String,
    pub cuisine_type: String,
    /// Normalized to `[0, 5]` regardless of the vendor scale.
    pub rating: f64,
    pub review_count: u32,
    /// 1 (cheapest) through 4.
    pub price_tier: u8,
    pub location: GeoPoint,
    pub delivery_available: bool,
    pub takeout_available: bool,
    pub reservations_available: bool,
    pub photo_urls: Vec<String>,
    pub source_name: String,
    pub source_confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Core,
    Buffer,
    Outside,
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Core => write!(f, "core"),
            Zone::Buffer => write!(f, "buffer"),
            Zone::Outside => write!(f, "outside"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonedCandidate {
    #[serde(flatten)]
    pub candidate: RestaurantCandidate,
    pub distance_km: f64,
    pub zone: Zone,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZoneCounts {
    pub core: usize,
    pub buffer: usize,
}

/// One adapter invocation inside one expansion attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceAttempt {
    pub attempt: u32,
    pub name: String,
    pub result_count: usize,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one radius-expansion attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub radius_km: f64,
    pub candidate_count: usize,
    pub source_used: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMetrics {
    pub attempts_made: u32,
    pub final_radius_km: f64,
    /// The last expansion factor applied; `1.0` when the first attempt sufficed.
    pub expansion_factor: f64,
    pub elapsed_ms: u64,
    pub sources_tried: Vec<SourceAttempt>,
    pub attempts: Vec<AttemptRecord>,
}

/// The engine's answer to one request.
///
/// `zone_counts` describe the geographic result before filtering and
/// pagination; `total` counts filtered items before pagination; `items` is
/// the requested page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub items: Vec<ZonedCandidate>,
    pub total: usize,
    pub zone_counts: ZoneCounts,
    pub source_used: String,
    /// `true` when `items` are generated placeholders, not real restaurants.
    pub is_synthetic: bool,
    pub metrics: SearchMetrics,
}
