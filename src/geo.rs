//! Great-circle distance and map-scale helpers

use haversine::{Location as HaversineLocation, Units, distance};

use crate::models::GeoPoint;

/// Mean Earth radius used by the distance calculation
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
///
/// Malformed input (NaN coordinates) yields NaN.
#[must_use]
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let from = HaversineLocation {
        latitude: a.latitude,
        longitude: a.longitude,
    };
    let to = HaversineLocation {
        latitude: b.latitude,
        longitude: b.longitude,
    };
    // the crate works on a 6371 km sphere
    distance(from, to, Units::Kilometers) * 1000.0
}

/// Convert a radius in kilometers to whole meters, never negative
#[must_use]
pub fn km_to_meters(km: f64) -> f64 {
    (km * 1000.0).round().max(0.0)
}

/// Zoom level of a map region spanning `latitude_delta` degrees
#[must_use]
pub fn zoom_level_for_latitude_delta(latitude_delta: f64) -> u32 {
    let zoom = (360.0 / latitude_delta).log2().round();
    if zoom.is_finite() && zoom >= 1.0 {
        zoom as u32
    } else if zoom.is_infinite() && zoom > 0.0 {
        u32::MAX
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint {
            latitude: lat,
            longitude: lon,
        }
    }

    #[rstest]
    #[case(point(-23.5505, -46.6333))]
    #[case(point(0.0, 0.0))]
    #[case(point(89.9, 179.9))]
    fn test_distance_to_self_is_zero(#[case] p: GeoPoint) {
        assert_eq!(distance_meters(&p, &p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = point(-23.5505, -46.6333);
        let b = point(-22.9068, -43.1729);
        assert!((distance_meters(&a, &b) - distance_meters(&b, &a)).abs() < 1e-6);
    }

    #[test]
    fn test_known_distance() {
        // São Paulo to Rio de Janeiro, roughly 361 km
        let a = point(-23.5505, -46.6333);
        let b = point(-22.9068, -43.1729);
        let d = distance_meters(&a, &b);
        assert!(d > 355_000.0 && d < 365_000.0, "got {d}");
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = distance_meters(&point(0.0, 0.0), &point(1.0, 0.0));
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1.0, "got {d}, expected {expected}");
    }

    #[test]
    fn test_nan_propagates() {
        let d = distance_meters(&point(f64::NAN, 0.0), &point(1.0, 0.0));
        assert!(d.is_nan());
    }

    #[rstest]
    #[case(0.5, 500.0)]
    #[case(1.2345, 1235.0)]
    #[case(5.0, 5000.0)]
    #[case(-1.0, 0.0)]
    fn test_km_to_meters(#[case] km: f64, #[case] meters: f64) {
        assert_eq!(km_to_meters(km), meters);
    }

    #[rstest]
    #[case(0.01, 15)]
    #[case(0.1, 12)]
    #[case(0.2, 11)]
    #[case(360.0, 1)]
    #[case(720.0, 1)]
    fn test_zoom_level(#[case] delta: f64, #[case] zoom: u32) {
        assert_eq!(zoom_level_for_latitude_delta(delta), zoom);
    }
}
