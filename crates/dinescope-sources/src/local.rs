//! Adapter over the relational `restaurants` table.
//!
//! Pre-filters with a bounding box in SQL, then keeps only rows within the
//! exact great-circle radius.

use std::time::Duration;

use async_trait::async_trait;
use dinescope_core::{bounding_box, distance_km, GeoPoint, RestaurantCandidate};
use dinescope_db::RestaurantRow;
use sqlx::PgPool;

use crate::adapter::{FetchQuery, SourceAdapter};
use crate::error::SourceError;
use crate::normalize::{
    normalize_rating, price_tier_from_stored, review_count_from, text_or, DEFAULT_CUISINE,
    DEFAULT_NAME,
};

pub const LOCAL_STORE_SOURCE: &str = "local_store";

const LOCAL_PRIORITY: u16 = 1_000;
const LOCAL_CONFIDENCE: f64 = 0.7;

/// Over-fetch so the exact-radius refinement can still fill `limit`.
const BOX_OVERFETCH: usize = 2;

pub struct LocalStoreAdapter {
    pool: PgPool,
    timeout: Duration,
}

impl LocalStoreAdapter {
    #[must_use]
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl SourceAdapter for LocalStoreAdapter {
    fn name(&self) -> &str {
        LOCAL_STORE_SOURCE
    }

    fn priority(&self) -> u16 {
        LOCAL_PRIORITY
    }

    fn confidence(&self) -> f64 {
        LOCAL_CONFIDENCE
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<RestaurantCandidate>, SourceError> {
        let bbox = bounding_box(query.center, query.radius_km);
        let row_limit =
            i64::try_from(query.limit.saturating_mul(BOX_OVERFETCH)).unwrap_or(i64::MAX);

        // The pool connection is scoped to this call and returned on every
        // exit path, including when the chain drops this future.
        let rows = dinescope_db::list_restaurants_in_box(
            &self.pool,
            &bbox,
            query.center.latitude(),
            query.center.longitude(),
            row_limit,
        )
        .await
        .map_err(classify_sqlx_error)?;

        let fetched = rows.len();
        let candidates = refine_rows(rows, query);
        tracing::debug!(
            source = LOCAL_STORE_SOURCE,
            fetched,
            kept = candidates.len(),
            radius_km = query.radius_km,
            "local store query finished"
        );
        Ok(candidates)
    }
}

/// Map rows, drop unlocatable ones, keep those within the exact radius.
fn refine_rows(rows: Vec<RestaurantRow>, query: &FetchQuery) -> Vec<RestaurantCandidate> {
    let mut candidates: Vec<RestaurantCandidate> = rows
        .into_iter()
        .filter_map(row_to_candidate)
        .filter(|c| distance_km(query.center, c.location) <= query.radius_km)
        .collect();
    candidates.truncate(query.limit);
    candidates
}

fn row_to_candidate(row: RestaurantRow) -> Option<RestaurantCandidate> {
    let Ok(location) = GeoPoint::new(row.latitude, row.longitude) else {
        tracing::warn!(
            source = LOCAL_STORE_SOURCE,
            id = %row.id,
            "row has out-of-range coordinates; skipped"
        );
        return None;
    };

    Some(RestaurantCandidate {
        id: row.id,
        name: text_or(Some(&row.name), DEFAULT_NAME),
        cuisine_type: text_or(row.cuisine_type.as_deref(), DEFAULT_CUISINE),
        rating: normalize_rating(row.rating, 5.0),
        review_count: review_count_from(row.review_count.map(i64::from)),
        price_tier: price_tier_from_stored(row.price_tier),
        location,
        delivery_available: row.delivery_available.unwrap_or(false),
        takeout_available: row.takeout_available.unwrap_or(false),
        reservations_available: row.reservations_available.unwrap_or(false),
        photo_urls: row.photo_url.into_iter().filter(|u| !u.is_empty()).collect(),
        source_name: LOCAL_STORE_SOURCE.to_string(),
        source_confidence: LOCAL_CONFIDENCE,
    })
}

fn classify_sqlx_error(e: sqlx::Error) -> SourceError {
    match e {
        sqlx::Error::PoolTimedOut => {
            SourceError::unavailable(LOCAL_STORE_SOURCE, "connection pool exhausted")
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_) => {
            SourceError::malformed(LOCAL_STORE_SOURCE, e.to_string())
        }
        other => SourceError::unavailable(LOCAL_STORE_SOURCE, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, lat: f64, lng: f64) -> RestaurantRow {
        RestaurantRow {
            id: id.to_string(),
            name: "Krua Apsorn".to_string(),
            cuisine_type: Some("Thai".to_string()),
            rating: Some(4.3),
            review_count: Some(120),
            price_tier: Some(2),
            latitude: lat,
            longitude: lng,
            delivery_available: Some(true),
            takeout_available: None,
            reservations_available: None,
            photo_url: Some("https://img.example.com/1.jpg".to_string()),
        }
    }

    fn query(limit: usize) -> FetchQuery {
        FetchQuery {
            center: GeoPoint::new(13.7563, 100.5018).expect("valid point"),
            radius_km: 2.0,
            limit,
            category: "restaurant".to_string(),
        }
    }

    #[test]
    fn row_maps_with_defaults_for_nulls() {
        let mut r = row("7", 13.75, 100.5);
        r.cuisine_type = None;
        r.rating = None;
        r.review_count = None;
        r.price_tier = None;
        r.photo_url = None;

        let c = row_to_candidate(r).expect("mapped");
        assert_eq!(c.cuisine_type, DEFAULT_CUISINE);
        assert_eq!(c.rating, 0.0);
        assert_eq!(c.review_count, 0);
        assert_eq!(c.price_tier, 2);
        assert!(c.photo_urls.is_empty());
        assert_eq!(c.source_name, LOCAL_STORE_SOURCE);
        assert!(c.delivery_available);
        assert!(!c.takeout_available);
    }

    #[test]
    fn out_of_range_row_is_skipped() {
        assert!(row_to_candidate(row("bad", 91.0, 0.0)).is_none());
    }

    #[test]
    fn refine_drops_box_corners_outside_radius() {
        // ~1 km north: inside. Box corner at ~2 km north and ~2 km east is
        // ~2.8 km away: outside the circle but inside the box.
        let inside = row("in", 13.7653, 100.5018);
        let corner = row("corner", 13.7743, 100.5203);
        let kept = refine_rows(vec![inside, corner], &query(10));
        let ids: Vec<&str> = kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["in"]);
    }

    #[test]
    fn refine_truncates_to_limit() {
        let rows = (0..5)
            .map(|i| row(&i.to_string(), 13.7563, 100.5018))
            .collect();
        assert_eq!(refine_rows(rows, &query(3)).len(), 3);
    }

    #[test]
    fn pool_timeout_is_unavailable() {
        let err = classify_sqlx_error(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), "unavailable");
        assert!(err.to_string().contains("pool exhausted"));
    }

    #[test]
    fn missing_column_is_malformed() {
        let err = classify_sqlx_error(sqlx::Error::ColumnNotFound("rating".to_string()));
        assert_eq!(err.kind(), "malformed_response");
    }
}
