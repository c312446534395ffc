//! Caller predicates over zoned candidates.

use dinescope_core::{RestaurantCandidate, ResultFilterSpec, ZonedCandidate};

/// A [`ResultFilterSpec`] prepared for repeated matching.
///
/// All predicates are a conjunction; unset predicates always pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultFilter {
    cuisine: Option<String>,
    price_ceiling: Option<u8>,
    min_rating: Option<f64>,
    require_delivery: bool,
    require_takeout: bool,
}

impl ResultFilter {
    #[must_use]
    pub fn new(spec: &ResultFilterSpec) -> Self {
        Self {
            cuisine: spec
                .cuisine
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_lowercase),
            price_ceiling: spec.price_ceiling,
            min_rating: spec.min_rating,
            require_delivery: spec.require_delivery,
            require_takeout: spec.require_takeout,
        }
    }

    #[must_use]
    pub fn matches(&self, candidate: &RestaurantCandidate) -> bool {
        if let Some(cuisine) = &self.cuisine {
            if !candidate.cuisine_type.to_lowercase().contains(cuisine.as_str()) {
                return false;
            }
        }
        if self
            .price_ceiling
            .is_some_and(|ceiling| candidate.price_tier > ceiling)
        {
            return false;
        }
        if self.min_rating.is_some_and(|min| candidate.rating < min) {
            return false;
        }
        if self.require_delivery && !candidate.delivery_available {
            return false;
        }
        !(self.require_takeout && !candidate.takeout_available)
    }

    /// Keep matching items, preserving order.
    #[must_use]
    pub fn apply(&self, items: Vec<ZonedCandidate>) -> Vec<ZonedCandidate> {
        items
            .into_iter()
            .filter(|item| self.matches(&item.candidate))
            .collect()
    }
}
