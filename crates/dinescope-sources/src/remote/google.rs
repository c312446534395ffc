//! Nearby-search profile: `status` envelope, 0–5 rating, 0–4 `price_level`.

use dinescope_core::{GeoPoint, RestaurantCandidate};
use reqwest::Url;
use serde::Deserialize;

use super::{radius_meters, RemotePlacesAdapter};
use crate::adapter::FetchQuery;
use crate::error::SourceError;
use crate::normalize::{
    cuisine_from_google_types, normalize_rating, price_tier_from_level, review_count_from,
    text_or, DEFAULT_NAME,
};

const MAX_RADIUS_M: u32 = 50_000;
const PHOTO_MAX_WIDTH: &str = "400";

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<GooglePlace>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GooglePlace {
    place_id: Option<String>,
    name: Option<String>,
    geometry: Option<Geometry>,
    rating: Option<f64>,
    user_ratings_total: Option<i64>,
    price_level: Option<i64>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<GooglePhoto>,
    delivery: Option<bool>,
    takeout: Option<bool>,
    reservable: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GooglePhoto {
    photo_reference: Option<String>,
}

impl RemotePlacesAdapter {
    pub(super) async fn fetch_google(
        &self,
        query: &FetchQuery,
    ) -> Result<Vec<RestaurantCandidate>, SourceError> {
        let name = self.config.name.as_str();
        let mut url = self.endpoint("nearbysearch/json")?;
        url.query_pairs_mut()
            .append_pair(
                "location",
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
            .append_pair("type", &query.category)
            .append_pair("key", &self.config.api_key);

        let body = self.request_json(self.client.get(url)).await?;
        let response: NearbyResponse = self.decode(body)?;

        match response.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            "OVER_QUERY_LIMIT" => {
                return Err(SourceError::RateLimited {
                    source_name: name.to_string(),
                    retry_after_secs: super::DEFAULT_RETRY_AFTER_SECS,
                })
            }
            "REQUEST_DENIED" | "INVALID_REQUEST" => {
                let detail = response.error_message.unwrap_or_default();
                return Err(SourceError::unavailable(
                    name,
                    format!("{}: {detail}", response.status),
                ));
            }
            other => {
                return Err(SourceError::malformed(
                    name,
                    format!("unknown status {other}"),
                ))
            }
        }

        let photo_base = self.endpoint("photo")?;
        let total = response.results.len();
        let mut candidates: Vec<RestaurantCandidate> = response
            .results
            .into_iter()
            .filter_map(|place| {
                place_to_candidate(place, name, self.config.confidence, &photo_base)
            })
            .collect();

        let skipped = total - candidates.len();
        if skipped > 0 {
            tracing::warn!(
                source = name,
                skipped,
                "places without a usable location were skipped"
            );
        }

        candidates.truncate(query.limit);
        Ok(candidates)
    }
}

fn place_to_candidate(
    place: GooglePlace,
    source_name: &str,
    confidence: f64,
    photo_base: &Url,
) -> Option<RestaurantCandidate> {
    let loc = place.geometry.and_then(|g| g.location)?;
    let location = GeoPoint::new(loc.lat, loc.lng).ok()?;

    let id = place
        .place_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("{source_name}:{:.6},{:.6}", loc.lat, loc.lng));

    let photo_urls = place
        .photos
        .iter()
        .filter_map(|p| p.photo_reference.as_deref())
        .map(|reference| {
            let mut url = photo_base.clone();
            url.query_pairs_mut()
                .append_pair("maxwidth", PHOTO_MAX_WIDTH)
                .append_pair("photo_reference", reference);
            url.to_string()
        })
        .collect();

    Some(RestaurantCandidate {
        id,
        name: text_or(place.name.as_deref(), DEFAULT_NAME),
        cuisine_type: cuisine_from_google_types(&place.types),
        rating: normalize_rating(place.rating, 5.0),
        review_count: review_count_from(place.user_ratings_total),
        price_tier: price_tier_from_level(place.price_level),
        location,
        delivery_available: place.delivery.unwrap_or(false),
        takeout_available: place.takeout.unwrap_or(false),
        reservations_available: place.reservable.unwrap_or(false),
        photo_urls,
        source_name: source_name.to_string(),
        source_confidence: confidence,
    })
}
