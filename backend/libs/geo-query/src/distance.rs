//! Great-circle distance on a mean-radius sphere.

use crate::point::GeoPoint;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance between two points using the haversine formula (meters)
///
/// Spherical model: roughly 0.5% off the ellipsoid, fine for proximity search.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // rounding can push h slightly outside [0, 1] near antipodes
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(35.681236, 139.767125);
        assert_eq!(haversine_meters(p, p), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        let expected = EARTH_RADIUS_M * PI / 180.0;
        assert!((d - expected).abs() < 1e-6, "got {}", d);
    }

    #[test]
    fn test_tokyo_to_osaka() {
        // Tokyo Station -> Osaka Station, ~403 km
        let tokyo = GeoPoint::new(35.681236, 139.767125);
        let osaka = GeoPoint::new(34.702485, 135.495951);
        let d = haversine_meters(tokyo, osaka);
        assert!(d > 395_000.0 && d < 410_000.0, "got {}", d);
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let d = haversine_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - PI * EARTH_RADIUS_M).abs() < 1.0);

        let d = haversine_meters(GeoPoint::new(90.0, 0.0), GeoPoint::new(-90.0, 0.0));
        assert!(d.is_finite());
        assert!((d - PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn test_across_antimeridian() {
        let west = GeoPoint::new(0.0, 179.999);
        let east = GeoPoint::new(0.0, -179.999);
        let d = haversine_meters(west, east);
        // 0.002 degrees of longitude at the equator
        assert!((d - 0.002 * EARTH_RADIUS_M * PI / 180.0).abs() < 1e-3);
    }
}
