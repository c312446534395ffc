//! Place-search profile: 0–10 rating, 1–4 `price`, key in `Authorization`.

use dinescope_core::{GeoPoint, RestaurantCandidate};
use serde::Deserialize;

use super::{radius_meters, RemotePlacesAdapter};
use crate::adapter::FetchQuery;
use crate::error::SourceError;
use crate::normalize::{
    normalize_rating, price_tier_from_level, review_count_from, text_or, DEFAULT_CUISINE,
    DEFAULT_NAME,
};

const MAX_RADIUS_M: u32 = 100_000;
const MAX_PAGE_SIZE: usize = 50;
const FIELDS: &str = "fsq_id,name,geocodes,categories,rating,price,photos,stats,features";
const RATING_SCALE: f64 = 10.0;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<FoursquarePlace>,
}

#[derive(Debug, Deserialize)]
struct FoursquarePlace {
    fsq_id: Option<String>,
    name: Option<String>,
    geocodes: Option<Geocodes>,
    #[serde(default)]
    categories: Vec<Category>,
    rating: Option<f64>,
    price: Option<i64>,
    #[serde(default)]
    photos: Vec<Photo>,
    stats: Option<Stats>,
    features: Option<Features>,
}

#[derive(Debug, Deserialize)]
struct Geocodes {
    main: Option<Coordinates>,
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct Category {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    prefix: Option<String>,
    suffix: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Stats {
    total_ratings: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct Features {
    services: Option<Services>,
}

#[derive(Debug, Default, Deserialize)]
struct Services {
    delivery: Option<bool>,
    takeout: Option<bool>,
    dine_in: Option<DineIn>,
}

#[derive(Debug, Default, Deserialize)]
struct DineIn {
    reservations: Option<bool>,
}

impl RemotePlacesAdapter {
    pub(super) async fn fetch_foursquare(
        &self,
        query: &FetchQuery,
    ) -> Result<Vec<RestaurantCandidate>, SourceError> {
        let name = self.config.name.as_str();
        let mut url = self.endpoint("places/search")?;
        url.query_pairs_mut()
            .append_pair(
                "ll",
                &format!(
                    "{},{}",
                    query.center.latitude(),
                    query.center.longitude()
                ),
            )
            .append_pair(
                "radius",
                &radius_meters(query.radius_km, MAX_RADIUS_M).to_string(),
            )
            .append_pair("query", &query.category)
            .append_pair("limit", &query.limit.clamp(1, MAX_PAGE_SIZE).to_string())
            .append_pair("fields", FIELDS);

        let request = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json");
        let body = self.request_json(request).await?;
        let response: SearchResponse = self.decode(body)?;

        let total = response.results.len();
        let mut candidates: Vec<RestaurantCandidate> = response
            .results
            .into_iter()
            .filter_map(|place| place_to_candidate(place, name, self.config.confidence))
            .collect();

        let skipped = total - candidates.len();
        if skipped > 0 {
            tracing::warn!(
                source = name,
                skipped,
                "places without a usable geocode were skipped"
            );
        }

        candidates.truncate(query.limit);
        Ok(candidates)
    }
}

fn place_to_candidate(
    place: FoursquarePlace,
    source_name: &str,
    confidence: f64,
) -> Option<RestaurantCandidate> {
    let coords = place.geocodes.and_then(|g| g.main)?;
    let location = GeoPoint::new(coords.latitude, coords.longitude).ok()?;

    let id = place
        .fsq_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| {
            format!(
                "{source_name}:{:.6},{:.6}",
                coords.latitude, coords.longitude
            )
        });

    let cuisine_type = text_or(
        place.categories.first().and_then(|c| c.name.as_deref()),
        DEFAULT_CUISINE,
    );

    let photo_urls = place
        .photos
        .iter()
        .filter_map(|p| match (&p.prefix, &p.suffix) {
            (Some(prefix), Some(suffix)) => Some(format!("{prefix}original{suffix}")),
            _ => None,
        })
        .collect();

    let services = place
        .features
        .and_then(|f| f.services)
        .unwrap_or_default();
    let reservations = services
        .dine_in
        .as_ref()
        .and_then(|d| d.reservations)
        .unwrap_or(false);

    Some(RestaurantCandidate {
        id,
        name: text_or(place.name.as_deref(), DEFAULT_NAME),
        cuisine_type,
        rating: normalize_rating(place.rating, RATING_SCALE),
        review_count: review_count_from(place.stats.and_then(|s| s.total_ratings)),
        price_tier: price_tier_from_level(place.price),
        location,
        delivery_available: services.delivery.unwrap_or(false),
        takeout_available: services.takeout.unwrap_or(false),
        reservations_available: reservations,
        photo_urls,
        source_name: source_name.to_string(),
        source_confidence: confidence,
    })
}
