//! Venue categories offered by the filter screen and their provider codes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::VenueScoutError;

/// Venue category a search can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchCategory {
    Bar,
    Restaurant,
    Nightclub,
    Cafe,
    QuickService,
    LiquorStore,
    FoodTruck,
}

impl SearchCategory {
    /// Every category, in filter-screen order
    pub const ALL: [SearchCategory; 7] = [
        SearchCategory::Bar,
        SearchCategory::Restaurant,
        SearchCategory::Nightclub,
        SearchCategory::Cafe,
        SearchCategory::QuickService,
        SearchCategory::LiquorStore,
        SearchCategory::FoodTruck,
    ];

    /// Categories queried when the user selected no filter.
    ///
    /// The provider has no "everything" mode, so an unfiltered search fans
    /// out over the general nightlife and dining types.
    pub const DEFAULTS: [SearchCategory; 6] = [
        SearchCategory::Bar,
        SearchCategory::Restaurant,
        SearchCategory::Nightclub,
        SearchCategory::Cafe,
        SearchCategory::QuickService,
        SearchCategory::LiquorStore,
    ];

    /// Provider place type used for nearby search
    #[must_use]
    pub const fn provider_code(self) -> &'static str {
        match self {
            SearchCategory::Bar => "bar",
            SearchCategory::Restaurant => "restaurant",
            SearchCategory::Nightclub => "night_club",
            SearchCategory::Cafe => "cafe",
            SearchCategory::QuickService | SearchCategory::FoodTruck => "meal_takeaway",
            SearchCategory::LiquorStore => "liquor_store",
        }
    }

    /// Label shown by the filter screen
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SearchCategory::Bar => "Bares",
            SearchCategory::Restaurant => "Restaurantes",
            SearchCategory::Nightclub => "Baladas",
            SearchCategory::Cafe => "Cafés",
            SearchCategory::QuickService => "Lanchonetes",
            SearchCategory::LiquorStore => "Adegas",
            SearchCategory::FoodTruck => "Food Trucks",
        }
    }

    /// Look up a category by its filter-screen label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Category for a single provider place type
    #[must_use]
    pub fn from_provider_code(code: &str) -> Option<Self> {
        match code {
            "bar" => Some(SearchCategory::Bar),
            "restaurant" => Some(SearchCategory::Restaurant),
            "night_club" => Some(SearchCategory::Nightclub),
            "cafe" => Some(SearchCategory::Cafe),
            // two categories share this code; the more specific one is shown
            "meal_takeaway" => Some(SearchCategory::FoodTruck),
            "liquor_store" => Some(SearchCategory::LiquorStore),
            _ => None,
        }
    }

    /// First category matching a provider type list, `Bar` when none match
    #[must_use]
    pub fn for_place_types<S: AsRef<str>>(types: &[S]) -> Self {
        types
            .iter()
            .find_map(|t| Self::from_provider_code(t.as_ref()))
            .unwrap_or(SearchCategory::Bar)
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SearchCategory {
    type Err = VenueScoutError;

    /// Accepts either the filter label or the provider code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_label(s)
            .or_else(|| match s.to_lowercase().as_str() {
                "bar" => Some(SearchCategory::Bar),
                "restaurant" => Some(SearchCategory::Restaurant),
                "nightclub" | "night_club" => Some(SearchCategory::Nightclub),
                "cafe" => Some(SearchCategory::Cafe),
                "quickservice" | "quick_service" | "meal_takeaway" => {
                    Some(SearchCategory::QuickService)
                }
                "liquorstore" | "liquor_store" => Some(SearchCategory::LiquorStore),
                "foodtruck" | "food_truck" => Some(SearchCategory::FoodTruck),
                _ => None,
            })
            .ok_or_else(|| VenueScoutError::validation(format!("unknown category '{s}'")))
    }
}

/// Selection coming back from the filter screen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Category labels as shown on the filter screen
    #[serde(default)]
    pub categories: Vec<String>,
    /// Minimum rating, 0 disables the filter
    #[serde(default)]
    pub min_rating: f64,
}

impl FilterSelection {
    /// Resolve labels to categories; unknown labels search restaurants
    #[must_use]
    pub fn categories(&self) -> Vec<SearchCategory> {
        self.categories
            .iter()
            .map(|label| {
                SearchCategory::from_label(label).unwrap_or_else(|| {
                    warn!("Unknown filter label '{}', searching restaurants", label);
                    SearchCategory::Restaurant
                })
            })
            .collect()
    }

    /// Minimum rating if one was chosen
    #[must_use]
    pub fn min_rating(&self) -> Option<f64> {
        (self.min_rating > 0.0).then_some(self.min_rating)
    }
}
