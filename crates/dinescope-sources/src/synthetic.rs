//! Deterministic placeholder restaurants for demos and offline runs.
//!
//! Output depends only on the query center (and radius for placement), so the
//! same request always yields the same data. Every candidate carries
//! `source_name == "synthetic"`, confidence `0.0`, and a `synthetic-` id.

use std::f64::consts::TAU;
use std::time::Duration;

use async_trait::async_trait;
use dinescope_core::{offset_point, GeoPoint, RestaurantCandidate, SOURCE_SYNTHETIC};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::adapter::{FetchQuery, SourceAdapter};
use crate::error::SourceError;

const DEFAULT_COUNT: usize = 12;

/// Keeps generated points strictly inside the queried radius.
const PLACEMENT_FRACTION: f64 = 0.95;

const CUISINES: &[(&str, &[&str])] = &[
    ("Thai", &["Baan", "Krua", "Ruen"]),
    ("Japanese", &["Sakura", "Hanami", "Koi"]),
    ("Italian", &["Trattoria", "Osteria", "Cucina"]),
    ("Indian", &["Masala", "Tandoor", "Spice Route"]),
    ("Mexican", &["Cantina", "Taqueria", "Casa"]),
    ("Vietnamese", &["Pho", "Saigon", "Lotus"]),
];

const NAME_SUFFIXES: &[&str] = &["Kitchen", "House", "Corner", "Table", "Garden"];

pub struct SyntheticAdapter {
    count: usize,
}

impl Default for SyntheticAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: DEFAULT_COUNT,
        }
    }

    #[must_use]
    pub fn with_count(count: usize) -> Self {
        Self { count }
    }

    fn generate(&self, query: &FetchQuery) -> Vec<RestaurantCandidate> {
        let seed = center_seed(query.center);
        let mut rng = StdRng::seed_from_u64(seed);
        let max_distance = query.radius_km * PLACEMENT_FRACTION;

        (0..self.count.min(query.limit))
            .map(|i| {
                // sqrt keeps the density uniform over the disc
                let distance = max_distance * rng.random::<f64>().sqrt();
                let bearing = rng.random::<f64>() * TAU;
                let location = offset_point(query.center, bearing, distance);

                let (cuisine, prefixes) = CUISINES[rng.random_range(0..CUISINES.len())];
                let prefix = prefixes[rng.random_range(0..prefixes.len())];
                let suffix = NAME_SUFFIXES[rng.random_range(0..NAME_SUFFIXES.len())];
                let rating = f64::from(rng.random_range(30..=50_u8)) / 10.0;

                RestaurantCandidate {
                    id: format!("synthetic-{seed:x}-{i}"),
                    name: format!("{prefix} {suffix}"),
                    cuisine_type: cuisine.to_string(),
                    rating,
                    review_count: rng.random_range(5..=500),
                    price_tier: rng.random_range(1..=4),
                    location,
                    delivery_available: rng.random_bool(0.5),
                    takeout_available: rng.random_bool(0.6),
                    reservations_available: rng.random_bool(0.3),
                    photo_urls: Vec::new(),
                    source_name: SOURCE_SYNTHETIC.to_string(),
                    source_confidence: 0.0,
                }
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for SyntheticAdapter {
    fn name(&self) -> &str {
        SOURCE_SYNTHETIC
    }

    fn priority(&self) -> u16 {
        u16::MAX
    }

    fn confidence(&self) -> f64 {
        0.0
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<RestaurantCandidate>, SourceError> {
        let candidates = self.generate(query);
        tracing::debug!(
            count = candidates.len(),
            radius_km = query.radius_km,
            "generated synthetic candidates"
        );
        Ok(candidates)
    }
}

/// First eight bytes of SHA-256 over the center rounded to five decimals.
fn center_seed(center: GeoPoint) -> u64 {
    let key = format!("{:.5},{:.5}", center.latitude(), center.longitude());
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
