//! Read-only queries against the externally-owned `restaurants` table.
//!
//! Expected columns: `id`, `name`, `cuisine_type`, `rating`, `review_count`,
//! `price_tier`, `latitude`, `longitude`, `delivery_available`,
//! `takeout_available`, `reservations_available`, `photo_url`. Numeric
//! columns are cast to `float8` so `NUMERIC` and `REAL` schemas both decode.

use dinescope_core::BoundingBox;
use sqlx::PgPool;

const SELECT_COLUMNS: &str = "SELECT id::text AS id, name, cuisine_type, \
        rating::float8 AS rating, review_count::int4 AS review_count, \
        price_tier::int2 AS price_tier, \
        latitude::float8 AS latitude, longitude::float8 AS longitude, \
        delivery_available, takeout_available, reservations_available, photo_url \
     FROM restaurants";

/// A restaurant row as stored; nullable columns stay `Option` until the
/// adapter applies defaults.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RestaurantRow {
    pub id: String,
    pub name: String,
    pub cuisine_type: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub price_tier: Option<i16>,
    pub latitude: f64,
    pub longitude: f64,
    pub delivery_available: Option<bool>,
    pub takeout_available: Option<bool>,
    pub reservations_available: Option<bool>,
    pub photo_url: Option<String>,
}

/// List restaurants inside `bbox`, nearest to `(center_lat, center_lng)` first.
///
/// Ordering uses a cosine-scaled planar distance, which is enough to keep the
/// `LIMIT` from cutting nearby rows; callers refine with exact great-circle
/// distance afterwards.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_restaurants_in_box(
    pool: &PgPool,
    bbox: &BoundingBox,
    center_lat: f64,
    center_lng: f64,
    limit: i64,
) -> Result<Vec<RestaurantRow>, sqlx::Error> {
    let lng_scale = center_lat.to_radians().cos();
    let sql = box_query_sql(bbox.crosses_antimeridian());

    sqlx::query_as::<_, RestaurantRow>(&sql)
        .bind(bbox.south)
        .bind(bbox.north)
        .bind(bbox.west)
        .bind(bbox.east)
        .bind(center_lat)
        .bind(center_lng)
        .bind(lng_scale)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Longitude offset from `$6` wrapped into `[-180, 180)`, so rows across the
/// antimeridian rank by their true east-west gap.
const WRAPPED_LNG_DELTA: &str = "((longitude::float8 - $6 + 540) \
     - 360 * floor((longitude::float8 - $6 + 540) / 360) - 180)";

fn box_query_sql(crosses_antimeridian: bool) -> String {
    let longitude_predicate = if crosses_antimeridian {
        "(longitude >= $3 OR longitude <= $4)"
    } else {
        "longitude BETWEEN $3 AND $4"
    };

    format!(
        "{SELECT_COLUMNS} \
         WHERE latitude IS NOT NULL \
           AND longitude IS NOT NULL \
           AND latitude BETWEEN $1 AND $2 \
           AND {longitude_predicate} \
         ORDER BY power(latitude::float8 - $5, 2) \
                + power({WRAPPED_LNG_DELTA} * $7, 2) ASC \
         LIMIT $8"
    )
}
