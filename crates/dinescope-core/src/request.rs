//! Search request shape, defaults, and boundary validation.

use serde::Serialize;
use thiserror::Error;

use crate::geo::GeoPoint;

pub const DEFAULT_INITIAL_RADIUS_KM: f64 = 2.0;
pub const DEFAULT_MAX_RADIUS_KM: f64 = 15.0;
pub const DEFAULT_MIN_RESULT_COUNT: usize = 5;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;
pub const DEFAULT_BUFFER_KM: f64 = 0.5;
pub const DEFAULT_FETCH_LIMIT: usize = 60;
pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 200;
pub const DEFAULT_CATEGORY: &str = "restaurant";

/// A request that cannot be executed as given. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request: {0}")]
pub struct InvalidRequest(pub String);

/// Caller-supplied predicates, applied as a conjunction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultFilterSpec {
    /// Case-insensitive substring matched against `cuisine_type`.
    pub cuisine: Option<String>,
    /// Inclusive upper bound on `price_tier` (1..=4).
    pub price_ceiling: Option<u8>,
    /// Inclusive lower bound on `rating` (0..=5).
    pub min_rating: Option<f64>,
    pub require_delivery: bool,
    pub require_takeout: bool,
}

impl ResultFilterSpec {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cuisine.as_deref().is_none_or(|c| c.trim().is_empty())
            && self.price_ceiling.is_none()
            && self.min_rating.is_none()
            && !self.require_delivery
            && !self.require_takeout
    }
}

/// One discovery query. Built per call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub center: GeoPoint,
    pub initial_radius_km: f64,
    pub max_radius_km: f64,
    pub min_result_count: usize,
    pub max_attempts: u32,
    pub buffer_km: f64,
    /// Upper bound on candidates requested from a source per attempt.
    pub fetch_limit: usize,
    /// Place category forwarded to remote vendors.
    pub category: String,
    pub filters: ResultFilterSpec,
    pub page_limit: usize,
    pub page_offset: usize,
}

impl SearchRequest {
    /// A request around `center` with the default search envelope.
    #[must_use]
    pub fn new(center: GeoPoint) -> Self {
        Self {
            center,
            initial_radius_km: DEFAULT_INITIAL_RADIUS_KM,
            max_radius_km: DEFAULT_MAX_RADIUS_KM,
            min_result_count: DEFAULT_MIN_RESULT_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            buffer_km: DEFAULT_BUFFER_KM,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            category: DEFAULT_CATEGORY.to_string(),
            filters: ResultFilterSpec::default(),
            page_limit: DEFAULT_PAGE_LIMIT,
            page_offset: 0,
        }
    }

    /// Check every bound the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequest`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        // Re-run coordinate checks: the center may have been built elsewhere.
        GeoPoint::new(self.center.latitude(), self.center.longitude())?;

        if !self.initial_radius_km.is_finite() || self.initial_radius_km <= 0.0 {
            return Err(InvalidRequest(format!(
                "initial_radius_km must be > 0 (got {})",
                self.initial_radius_km
            )));
        }
        if !self.max_radius_km.is_finite() || self.max_radius_km < self.initial_radius_km {
            return Err(InvalidRequest(format!(
                "max_radius_km ({}) must be >= initial_radius_km ({})",
                self.max_radius_km, self.initial_radius_km
            )));
        }
        if !self.buffer_km.is_finite() || self.buffer_km < 0.0 {
            return Err(InvalidRequest(format!(
                "buffer_km must be >= 0 (got {})",
                self.buffer_km
            )));
        }
        if self.max_attempts == 0 {
            return Err(InvalidRequest("max_attempts must be >= 1".to_string()));
        }
        if self.fetch_limit == 0 {
            return Err(InvalidRequest("fetch_limit must be >= 1".to_string()));
        }
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(InvalidRequest(format!(
                "page_limit must be in 1..={MAX_PAGE_LIMIT} (got {})",
                self.page_limit
            )));
        }
        if let Some(ceiling) = self.filters.price_ceiling {
            if !(1..=4).contains(&ceiling) {
                return Err(InvalidRequest(format!(
                    "price_ceiling must be in 1..=4 (got {ceiling})"
                )));
            }
        }
        if let Some(min_rating) = self.filters.min_rating {
            if !min_rating.is_finite() || !(0.0..=5.0).contains(&min_rating) {
                return Err(InvalidRequest(format!(
                    "min_rating must be in [0, 5] (got {min_rating})"
                )));
            }
        }
        Ok(())
    }
}

/// Convert a signed count from an outer layer, rejecting negatives.
///
/// # Errors
///
/// Returns [`InvalidRequest`] when `value` is negative.
pub fn min_result_count_from_signed(value: i64) -> Result<usize, InvalidRequest> {
    usize::try_from(value)
        .map_err(|_| InvalidRequest(format!("min_result_count must be >= 0 (got {value})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bangkok() -> SearchRequest {
        SearchRequest::new(GeoPoint::new(13.7563, 100.5018).expect("valid center"))
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(bangkok().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_initial_radius() {
        let mut req = bangkok();
        req.initial_radius_km = 0.0;
        assert!(req.validate().is_err());
        req.initial_radius_km = -1.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_max_radius_below_initial() {
        let mut req = bangkok();
        req.initial_radius_km = 5.0;
        req.max_radius_km = 4.0;
        let err = req.validate().unwrap_err();
        assert!(err.0.contains("max_radius_km"), "got: {err}");
    }

    #[test]
    fn accepts_equal_initial_and_max_radius() {
        let mut req = bangkok();
        req.initial_radius_km = 3.0;
        req.max_radius_km = 3.0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_zero_attempts() {
        let mut req = bangkok();
        req.max_attempts = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_negative_buffer() {
        let mut req = bangkok();
        req.buffer_km = -0.1;
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_page_limit_out_of_range() {
        let mut req = bangkok();
        req.page_limit = 0;
        assert!(req.validate().is_err());
        req.page_limit = MAX_PAGE_LIMIT + 1;
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_filter_bounds_out_of_range() {
        let mut req = bangkok();
        req.filters.price_ceiling = Some(5);
        assert!(req.validate().is_err());

        let mut req = bangkok();
        req.filters.min_rating = Some(5.5);
        assert!(req.validate().is_err());
    }

    #[test]
    fn negative_min_result_count_is_rejected() {
        assert!(min_result_count_from_signed(-1).is_err());
        assert_eq!(min_result_count_from_signed(7), Ok(7));
    }

    #[test]
    fn empty_filter_spec_reports_empty() {
        assert!(ResultFilterSpec::default().is_empty());
        let spec = ResultFilterSpec {
            cuisine: Some("  ".to_string()),
            ..ResultFilterSpec::default()
        };
        assert!(spec.is_empty());
        let spec = ResultFilterSpec {
            require_takeout: true,
            ..ResultFilterSpec::default()
        };
        assert!(!spec.is_empty());
    }
}
