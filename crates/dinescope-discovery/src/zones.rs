//! Proximity zones around the search center.

use dinescope_core::{
    distance_km, GeoPoint, RestaurantCandidate, Zone, ZoneCounts, ZonedCandidate,
};

/// Zone for a candidate at `distance_km`. The boundary belongs to the inner
/// zone.
#[must_use]
pub fn zone_for(distance_km: f64, radius_km: f64, buffer_km: f64) -> Zone {
    if distance_km <= radius_km {
        Zone::Core
    } else if distance_km <= radius_km + buffer_km {
        Zone::Buffer
    } else {
        Zone::Outside
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneClassifier {
    center: GeoPoint,
    radius_km: f64,
    buffer_km: f64,
}

impl ZoneClassifier {
    #[must_use]
    pub fn new(center: GeoPoint, radius_km: f64, buffer_km: f64) -> Self {
        Self {
            center,
            radius_km,
            buffer_km,
        }
    }

    #[must_use]
    pub fn zone_candidate(&self, candidate: RestaurantCandidate) -> ZonedCandidate {
        let distance_km = distance_km(self.center, candidate.location);
        ZonedCandidate {
            zone: zone_for(distance_km, self.radius_km, self.buffer_km),
            distance_km,
            candidate,
        }
    }

    /// Classify every candidate, dropping those in [`Zone::Outside`].
    #[must_use]
    pub fn classify(&self, candidates: Vec<RestaurantCandidate>) -> Vec<ZonedCandidate> {
        let total = candidates.len();
        let zoned: Vec<ZonedCandidate> = candidates
            .into_iter()
            .map(|c| self.zone_candidate(c))
            .filter(|z| z.zone != Zone::Outside)
            .collect();
        let dropped = total - zoned.len();
        if dropped > 0 {
            tracing::debug!(
                dropped,
                radius_km = self.radius_km,
                buffer_km = self.buffer_km,
                "dropped candidates outside the buffer"
            );
        }
        zoned
    }
}

#[must_use]
pub fn zone_counts(items: &[ZonedCandidate]) -> ZoneCounts {
    items.iter().fold(ZoneCounts::default(), |mut counts, item| {
        match item.zone {
            Zone::Core => counts.core += 1,
            Zone::Buffer => counts.buffer += 1,
            Zone::Outside => {}
        }
        counts
    })
}
