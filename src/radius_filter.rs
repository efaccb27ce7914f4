//! Post-query filtering by distance and rating

use tracing::debug;

use crate::geo::distance_meters;
use crate::models::{GeoPoint, PlaceResult};

/// The provider treats the nearby radius as a hint, so results are
/// re-checked against the exact great-circle distance.
pub struct RadiusFilter;

impl RadiusFilter {
    /// Keep results at most `radius_meters` from `origin`.
    ///
    /// Without a valid origin the input is returned unchanged. Results
    /// without a location are dropped.
    #[must_use]
    pub fn within_radius(
        results: Vec<PlaceResult>,
        origin: Option<&GeoPoint>,
        radius_meters: f64,
    ) -> Vec<PlaceResult> {
        let Some(origin) = origin.filter(|o| o.is_valid()) else {
            return results;
        };

        let before = results.len();
        let kept: Vec<PlaceResult> = results
            .into_iter()
            .filter(|place| {
                place
                    .location
                    .is_some_and(|location| distance_meters(origin, &location) <= radius_meters)
            })
            .collect();

        debug!(
            "Radius filter kept {} of {} results within {:.0} m",
            kept.len(),
            before,
            radius_meters
        );
        kept
    }

    /// Keep results rated at least `min_rating`; unrated counts as zero
    #[must_use]
    pub fn with_min_rating(results: Vec<PlaceResult>, min_rating: Option<f64>) -> Vec<PlaceResult> {
        match min_rating {
            Some(min) if min > 0.0 => results
                .into_iter()
                .filter(|place| place.rating_or_zero() >= min)
                .collect(),
            _ => results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn result_at(id: &str, location: Option<GeoPoint>, rating: Option<f64>) -> PlaceResult {
        PlaceResult {
            id: id.to_string(),
            name: id.to_string(),
            location,
            categories: vec!["bar".to_string()],
            rating,
            rating_count: None,
            open_now: None,
            address: None,
        }
    }

    fn sao_paulo() -> GeoPoint {
        GeoPoint::new(-23.5505, -46.6333).unwrap()
    }

    #[test]
    fn test_within_radius() {
        // ~550 m and ~1.7 km north of the origin
        let near = GeoPoint::new(-23.5455, -46.6333).unwrap();
        let far = GeoPoint::new(-23.5350, -46.6333).unwrap();
        let results = vec![
            result_at("near", Some(near), None),
            result_at("far", Some(far), None),
            result_at("nowhere", None, None),
        ];

        let kept = RadiusFilter::within_radius(results, Some(&sao_paulo()), 1000.0);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "near");
        assert!(
            kept.iter()
                .all(|r| distance_meters(&sao_paulo(), &r.location.unwrap()) <= 1000.0)
        );
    }

    #[test]
    fn test_origin_itself_is_within_zero_radius() {
        let results = vec![result_at("here", Some(sao_paulo()), None)];
        let kept = RadiusFilter::within_radius(results, Some(&sao_paulo()), 0.0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_missing_origin_is_noop() {
        let results = vec![
            result_at("a", None, None),
            result_at("b", Some(sao_paulo()), None),
        ];
        let kept = RadiusFilter::within_radius(results, None, 10.0);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_invalid_origin_is_noop() {
        let broken = GeoPoint {
            latitude: f64::NAN,
            longitude: 0.0,
        };
        let results = vec![result_at("a", None, None)];
        let kept = RadiusFilter::within_radius(results, Some(&broken), 10.0);
        assert_eq!(kept.len(), 1);
    }

    #[rstest]
    #[case(None, 3)]
    #[case(Some(0.0), 3)]
    #[case(Some(4.0), 2)]
    #[case(Some(4.6), 0)]
    fn test_min_rating(#[case] min_rating: Option<f64>, #[case] expected: usize) {
        let results = vec![
            result_at("good", None, Some(4.5)),
            result_at("ok", None, Some(4.0)),
            result_at("unrated", None, None),
        ];
        assert_eq!(
            RadiusFilter::with_min_rating(results, min_rating).len(),
            expected
        );
    }
}
