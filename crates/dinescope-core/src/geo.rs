//! Great-circle distance and bounding-box math.
//!
//! Box derivation uses the flat ~111 km-per-degree approximation; longitude
//! span widens with `1 / cos(latitude)` so the box covers the same physical
//! distance east-west as north-south.

use serde::Serialize;

use crate::request::InvalidRequest;

/// Mean Earth radius used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const KM_PER_DEGREE: f64 = 111.0;

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting out-of-range or non-finite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequest`] when latitude is outside `[-90, 90]` or
    /// longitude is outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidRequest> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidRequest(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidRequest(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Haversine distance in kilometres.
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Axis-aligned lat/lng box around a search center.
///
/// When the box straddles the antimeridian `west > east`; use
/// [`BoundingBox::crosses_antimeridian`] before building range predicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        let lat_ok = point.latitude >= self.south && point.latitude <= self.north;
        let lng_ok = if self.crosses_antimeridian() {
            point.longitude >= self.west || point.longitude <= self.east
        } else {
            point.longitude >= self.west && point.longitude <= self.east
        };
        lat_ok && lng_ok
    }
}

/// Derive the box enclosing a circle of `radius_km` around `center`.
///
/// The longitude delta is clamped to 180 degrees, which near the poles (where
/// `cos(latitude)` approaches zero) degrades to the full longitude range.
#[must_use]
pub fn bounding_box(center: GeoPoint, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let cos_lat = center.latitude.to_radians().cos();
    let lng_delta = if cos_lat <= f64::EPSILON {
        180.0
    } else {
        (radius_km / (KM_PER_DEGREE * cos_lat)).min(180.0)
    };

    let north = (center.latitude + lat_delta).min(90.0);
    let south = (center.latitude - lat_delta).max(-90.0);

    // A box touching a pole covers every meridian.
    if lng_delta >= 180.0 || north >= 90.0 || south <= -90.0 {
        return BoundingBox {
            north,
            south,
            east: 180.0,
            west: -180.0,
        };
    }

    BoundingBox {
        north,
        south,
        east: wrap_longitude(center.longitude + lng_delta),
        west: wrap_longitude(center.longitude - lng_delta),
    }
}

/// Move `distance_km` from `origin` along `bearing_rad` (0 = north, clockwise).
///
/// Uses the same flat approximation as [`bounding_box`], so it is only
/// accurate for the short hops used when placing generated candidates.
#[must_use]
pub fn offset_point(origin: GeoPoint, bearing_rad: f64, distance_km: f64) -> GeoPoint {
    let dlat = distance_km * bearing_rad.cos() / KM_PER_DEGREE;
    let cos_lat = origin.latitude.to_radians().cos().max(1e-6);
    let dlng = distance_km * bearing_rad.sin() / (KM_PER_DEGREE * cos_lat);

    GeoPoint {
        latitude: (origin.latitude + dlat).clamp(-90.0, 90.0),
        longitude: wrap_longitude(origin.longitude + dlng),
    }
}

fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        lng
    } else {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).expect("valid test point")
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(GeoPoint::new(95.0, 100.0).is_err());
        assert!(GeoPoint::new(-90.5, 0.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert!(GeoPoint::new(0.0, 180.01).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
    }

    #[test]
    fn accepts_boundary_coordinates() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (pt(13.7563, 100.5018), pt(13.7367, 100.5232)),
            (pt(40.7128, -74.0060), pt(51.5074, -0.1278)),
            (pt(-33.8688, 151.2093), pt(35.6762, 139.6503)),
            (pt(0.0, 179.9), pt(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            let ab = distance_km(a, b);
            let ba = distance_km(b, a);
            assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = pt(13.7563, 100.5018);
        assert!(distance_km(p, p).abs() < 1e-12);
    }

    #[test]
    fn new_york_to_london_is_about_5570_km() {
        let d = distance_km(pt(40.7128, -74.0060), pt(51.5074, -0.1278));
        assert!((d - 5570.0).abs() < 30.0, "got {d}");
    }

    #[test]
    fn distance_across_antimeridian_is_short() {
        let d = distance_km(pt(0.0, 179.95), pt(0.0, -179.95));
        assert!(d < 12.0, "got {d}");
    }

    #[test]
    fn bounding_box_uses_111_km_per_degree() {
        let bbox = bounding_box(pt(0.0, 0.0), 111.0);
        assert!((bbox.north - 1.0).abs() < 1e-9);
        assert!((bbox.south + 1.0).abs() < 1e-9);
        assert!((bbox.east - 1.0).abs() < 1e-9);
        assert!((bbox.west + 1.0).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_widens_longitude_at_higher_latitude() {
        let equator = bounding_box(pt(0.0, 10.0), 20.0);
        let north = bounding_box(pt(60.0, 10.0), 20.0);
        assert!((north.east - north.west) > (equator.east - equator.west));
        // cos(60°) = 0.5, so the span doubles.
        let ratio = (north.east - north.west) / (equator.east - equator.west);
        assert!((ratio - 2.0).abs() < 1e-6, "ratio {ratio}");
    }

    #[test]
    fn bounding_box_near_pole_covers_all_longitudes() {
        let bbox = bounding_box(pt(89.99, 45.0), 5.0);
        assert!((bbox.north - 90.0).abs() < f64::EPSILON);
        assert!((bbox.west + 180.0).abs() < f64::EPSILON);
        assert!((bbox.east - 180.0).abs() < f64::EPSILON);
        assert!(bbox.contains(pt(89.98, -170.0)));
    }

    #[test]
    fn bounding_box_wraps_across_antimeridian() {
        let bbox = bounding_box(pt(0.0, 179.9), 50.0);
        assert!(bbox.crosses_antimeridian());
        assert!(bbox.contains(pt(0.0, -179.9)));
        assert!(bbox.contains(pt(0.0, 179.5)));
        assert!(!bbox.contains(pt(0.0, 0.0)));
    }

    #[test]
    fn every_point_within_radius_is_inside_box() {
        let center = pt(13.7563, 100.5018);
        let bbox = bounding_box(center, 5.0);
        for step in 0..16 {
            let bearing = f64::from(step) * std::f64::consts::PI / 8.0;
            let p = offset_point(center, bearing, 4.9);
            assert!(distance_km(center, p) <= 5.0);
            assert!(bbox.contains(p), "bearing {bearing} escaped the box");
        }
    }

    #[test]
    fn offset_point_lands_near_requested_distance() {
        let center = pt(13.7563, 100.5018);
        let p = offset_point(center, 0.0, 3.0);
        let d = distance_km(center, p);
        assert!((d - 3.0).abs() < 0.05, "got {d}");
    }
}
