//! Search request issued by the map screen

use serde::{Deserialize, Serialize};

use super::{FilterSelection, GeoPoint, SearchCategory};

/// One user-triggered search.
///
/// When `free_text_query` holds a non-blank query the request is a text
/// search: categories, radius filtering and `min_rating` do not apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: GeoPoint,
    pub radius_meters: f64,
    /// Empty means the default category set
    #[serde(default)]
    pub categories: Vec<SearchCategory>,
    #[serde(default)]
    pub free_text_query: Option<String>,
    #[serde(default)]
    pub min_rating: Option<f64>,
}

impl SearchRequest {
    /// Nearby search over the default categories
    #[must_use]
    pub fn nearby(origin: GeoPoint, radius_meters: f64) -> Self {
        Self {
            origin,
            radius_meters: radius_meters.max(0.0),
            categories: Vec::new(),
            free_text_query: None,
            min_rating: None,
        }
    }

    /// Free text search around `origin`
    #[must_use]
    pub fn text(origin: GeoPoint, query: impl Into<String>) -> Self {
        Self {
            free_text_query: Some(query.into()),
            ..Self::nearby(origin, 0.0)
        }
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Vec<SearchCategory>) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    /// Apply what the filter screen returned
    #[must_use]
    pub fn with_filters(mut self, filters: &FilterSelection) -> Self {
        self.categories = filters.categories();
        self.min_rating = filters.min_rating();
        self
    }

    /// Trimmed text query, `None` when absent or blank
    #[must_use]
    pub fn text_query(&self) -> Option<&str> {
        self.free_text_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}
