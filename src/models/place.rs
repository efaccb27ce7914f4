//! Venue models produced by the search pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GeoPoint, SearchCategory};

/// A venue returned by a nearby or text search.
///
/// Identity is the provider `id`; two results with the same id are the same
/// venue regardless of the other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceResult {
    pub id: String,
    pub name: String,
    /// `None` when the provider payload had no usable coordinates
    pub location: Option<GeoPoint>,
    /// Provider place types, most specific first
    pub categories: Vec<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub open_now: Option<bool>,
    pub address: Option<String>,
}

impl PlaceResult {
    /// App category used for the map marker
    #[must_use]
    pub fn primary_category(&self) -> SearchCategory {
        SearchCategory::for_place_types(&self.categories)
    }

    /// Rating with "unrated" counted as zero
    #[must_use]
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

/// Full record for the venue detail screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub id: String,
    pub name: String,
    pub location: Option<GeoPoint>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub open_now: Option<bool>,
    /// One human readable line per weekday
    pub opening_hours: Vec<String>,
    /// Provider photo references, at most [`PlaceDetails::MAX_PHOTOS`]
    pub photo_references: Vec<String>,
    pub reviews: Vec<PlaceReview>,
    pub categories: Vec<String>,
}

impl PlaceDetails {
    pub const MAX_PHOTOS: usize = 5;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceReview {
    pub author: String,
    pub rating: Option<f64>,
    pub text: String,
    pub written_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_types(types: &[&str]) -> PlaceResult {
        PlaceResult {
            id: "p1".to_string(),
            name: "Bar do Zé".to_string(),
            location: None,
            categories: types.iter().map(ToString::to_string).collect(),
            rating: None,
            rating_count: None,
            open_now: None,
            address: None,
        }
    }

    #[test]
    fn test_primary_category() {
        let place = result_with_types(&["cafe", "food", "establishment"]);
        assert_eq!(place.primary_category(), SearchCategory::Cafe);

        let place = result_with_types(&["lodging"]);
        assert_eq!(place.primary_category(), SearchCategory::Bar);
    }

    #[test]
    fn test_rating_or_zero() {
        let mut place = result_with_types(&[]);
        assert_eq!(place.rating_or_zero(), 0.0);
        place.rating = Some(4.3);
        assert_eq!(place.rating_or_zero(), 4.3);
    }
}
