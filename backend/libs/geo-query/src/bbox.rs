//! Rectangular pre-filter around a query circle.
//!
//! The box is always a superset of the circle: storage uses it for a cheap
//! range scan and the exact haversine filter runs afterwards.

use crate::distance::EARTH_RADIUS_M;
use crate::point::GeoPoint;
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

/// Meters per degree of latitude used for the box deltas (1° ≈ 111.32 km)
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Substituted for `cos(lat)` when it is exactly zero
pub const POLE_COS_FLOOR: f64 = 1e-9;

/// Coordinate ranges in degrees, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lng < -180.0 || self.max_lng > 180.0
    }

    /// Split into boxes whose longitude ranges lie within [-180, 180].
    ///
    /// Returns one box when no wrap happens, two otherwise.
    pub fn split_antimeridian(&self) -> Vec<BoundingBox> {
        if self.lng_span() >= 360.0 {
            return vec![BoundingBox {
                min_lng: -180.0,
                max_lng: 180.0,
                ..*self
            }];
        }

        if self.min_lng < -180.0 {
            vec![
                BoundingBox {
                    min_lng: self.min_lng + 360.0,
                    max_lng: 180.0,
                    ..*self
                },
                BoundingBox {
                    min_lng: -180.0,
                    ..*self
                },
            ]
        } else if self.max_lng > 180.0 {
            vec![
                BoundingBox {
                    max_lng: 180.0,
                    ..*self
                },
                BoundingBox {
                    min_lng: -180.0,
                    max_lng: self.max_lng - 360.0,
                    ..*self
                },
            ]
        } else {
            vec![*self]
        }
    }
}

/// Compute the pre-filter box for a circle of `radius_m` meters around `center`.
///
/// The deltas start from the flat approximation `radius / 111_320` (scaled by
/// `1 / cos(lat)` for longitude) and are widened to the exact spherical extent
/// of the circle, since 111.32 km/° overestimates the 6371 km sphere. When the
/// circle reaches a pole every longitude is covered.
///
/// Callers validate `center` and `radius_m` first; this function never fails.
pub fn compute_bounding_box(center: GeoPoint, radius_m: f64) -> BoundingBox {
    let cos_lat = center.lat.to_radians().cos();
    let cos_lat = if cos_lat == 0.0 { POLE_COS_FLOOR } else { cos_lat };

    let approx_d_lat = radius_m / METERS_PER_DEGREE;
    let approx_d_lng = radius_m / (METERS_PER_DEGREE * cos_lat);

    let angular = radius_m / EARTH_RADIUS_M;
    let d_lat = approx_d_lat.max(angular.to_degrees());

    let (min_lng, max_lng) = match spherical_lng_extent(center.lat, angular) {
        Some(extent) if approx_d_lng.max(extent) < 180.0 => {
            let d_lng = approx_d_lng.max(extent);
            (center.lng - d_lng, center.lng + d_lng)
        }
        _ => (-180.0, 180.0),
    };

    BoundingBox {
        min_lat: (center.lat - d_lat).max(-90.0),
        max_lat: (center.lat + d_lat).min(90.0),
        min_lng,
        max_lng,
    }
}

/// Largest longitude offset (degrees) reached by a circle of angular radius
/// `angular` around latitude `lat_deg`, or `None` when it contains a pole.
fn spherical_lng_extent(lat_deg: f64, angular: f64) -> Option<f64> {
    let lat = lat_deg.to_radians();
    if lat.abs() + angular >= FRAC_PI_2 {
        return None;
    }

    let ratio = angular.sin() / lat.cos();
    if ratio >= 1.0 {
        return None;
    }
    Some(ratio.asin().to_degrees())
}
