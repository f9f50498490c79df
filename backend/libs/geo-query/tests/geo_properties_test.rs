//! Property sweeps for the distance function and the bounding box.
//!
//! Uses a seeded RNG so failures are reproducible.

use geo_query::{compute_bounding_box, haversine_meters, GeoPoint, EARTH_RADIUS_M};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLES: usize = 2_000;

fn random_point(rng: &mut StdRng) -> GeoPoint {
    GeoPoint::new(rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0))
}

/// Point reached from `start` after `distance_m` along `bearing_rad`.
fn destination(start: GeoPoint, bearing_rad: f64, distance_m: f64) -> GeoPoint {
    let delta = distance_m / EARTH_RADIUS_M;
    let lat1 = start.lat.to_radians();
    let lng1 = start.lng.to_radians();

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing_rad.cos()).asin();
    let lng2 = lng1
        + (bearing_rad.sin() * delta.sin() * lat1.cos())
            .atan2(delta.cos() - lat1.sin() * lat2.sin());

    let lng = (lng2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    GeoPoint::new(lat2.to_degrees(), lng)
}

#[test]
fn haversine_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..SAMPLES {
        let a = random_point(&mut rng);
        let b = random_point(&mut rng);
        let ab = haversine_meters(a, b);
        let ba = haversine_meters(b, a);
        let scale = ab.abs().max(1.0);
        assert!(
            (ab - ba).abs() / scale <= 1e-6,
            "asymmetric for {:?} {:?}: {} vs {}",
            a,
            b,
            ab,
            ba
        );
    }
}

#[test]
fn haversine_of_same_point_is_zero() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..SAMPLES {
        let a = random_point(&mut rng);
        assert_eq!(haversine_meters(a, a), 0.0, "non-zero for {:?}", a);
    }
}

#[test]
fn haversine_is_never_nan_for_valid_points() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..SAMPLES {
        let a = random_point(&mut rng);
        // near-antipodal pairs stress the clamp
        let b = GeoPoint::new(-a.lat, a.lng - 180.0_f64.copysign(a.lng));
        let d = haversine_meters(a, b);
        assert!(d.is_finite() && d >= 0.0, "bad distance {} for {:?}", d, a);
    }
}

#[test]
fn bounding_box_contains_every_point_within_radius() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..SAMPLES {
        let center = random_point(&mut rng);
        // log-uniform between 1 m and 2000 km
        let radius = 10f64.powf(rng.gen_range(0.0..6.3));
        let bbox = compute_bounding_box(center, radius);
        let parts = bbox.split_antimeridian();

        for _ in 0..8 {
            let bearing = rng.gen_range(0.0..std::f64::consts::TAU);
            let distance = radius * rng.gen_range(0.0..0.999);
            let point = destination(center, bearing, distance);

            assert!(
                haversine_meters(center, point) <= radius,
                "sampled point left the circle"
            );
            assert!(
                parts.iter().any(|b| b.contains(point)),
                "point {:?} at {:.3} m from {:?} escaped {:?} (radius {:.3})",
                point,
                distance,
                center,
                bbox,
                radius
            );
        }
    }
}

#[test]
fn bounding_box_keeps_invariants() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..SAMPLES {
        let center = random_point(&mut rng);
        let radius = 10f64.powf(rng.gen_range(0.0..7.5));
        let bbox = compute_bounding_box(center, radius);

        assert!(bbox.min_lat <= bbox.max_lat);
        assert!(bbox.min_lng <= bbox.max_lng);
        assert!(bbox.min_lat >= -90.0 && bbox.max_lat <= 90.0);
        for part in bbox.split_antimeridian() {
            assert!(part.min_lng >= -180.0 && part.max_lng <= 180.0, "{:?}", part);
            assert!(part.min_lng <= part.max_lng);
        }
    }
}
