//! Wire format of the places provider and conversion into domain models

use std::fmt;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::{GeoPoint, PlaceDetails, PlaceResult, PlaceReview};

/// Status field carried by every provider response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderStatus {
    Ok,
    ZeroResults,
    /// Also returned when a page token is presented before it is ready
    InvalidRequest,
    OverQueryLimit,
    RequestDenied,
    NotFound,
    UnknownError,
    #[serde(other)]
    Other,
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProviderStatus::Ok => "OK",
            ProviderStatus::ZeroResults => "ZERO_RESULTS",
            ProviderStatus::InvalidRequest => "INVALID_REQUEST",
            ProviderStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            ProviderStatus::RequestDenied => "REQUEST_DENIED",
            ProviderStatus::NotFound => "NOT_FOUND",
            ProviderStatus::UnknownError => "UNKNOWN_ERROR",
            ProviderStatus::Other => "OTHER",
        };
        f.write_str(text)
    }
}

/// One page of a nearby or text search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub status: ProviderStatus,
    #[serde(default)]
    pub results: Vec<RawPlace>,
    pub next_page_token: Option<String>,
    pub error_message: Option<String>,
}

impl SearchPage {
    /// Successful page, optionally pointing at a next page
    #[must_use]
    pub fn ok(results: Vec<RawPlace>, next_page_token: Option<&str>) -> Self {
        Self {
            status: ProviderStatus::Ok,
            results,
            next_page_token: next_page_token.map(ToString::to_string),
            error_message: None,
        }
    }

    /// Empty page with a non-OK status
    #[must_use]
    pub fn with_status(status: ProviderStatus) -> Self {
        Self {
            status,
            results: Vec::new(),
            next_page_token: None,
            error_message: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// Place entry as returned by search and details endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlace {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub types: Vec<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub opening_hours: Option<OpeningHours>,
    pub vicinity: Option<String>,
    pub formatted_address: Option<String>,
}

impl RawPlace {
    /// Minimal entry at a coordinate, mostly useful for scripted providers
    #[must_use]
    pub fn at(place_id: &str, lat: f64, lng: f64) -> Self {
        Self {
            place_id: Some(place_id.to_string()),
            name: Some(place_id.to_string()),
            geometry: Some(Geometry {
                location: Some(LatLng {
                    lat: Some(lat),
                    lng: Some(lng),
                }),
            }),
            ..Self::default()
        }
    }

    fn location(&self) -> Option<GeoPoint> {
        let location = self.geometry.as_ref()?.location.as_ref()?;
        GeoPoint::new(location.lat?, location.lng?).ok()
    }

    fn checked_rating(&self) -> Option<f64> {
        self.rating.filter(|r| (0.0..=5.0).contains(r))
    }

    /// Convert to a search result; entries without a place id are unusable
    #[must_use]
    pub fn into_place_result(self) -> Option<PlaceResult> {
        let location = self.location();
        let rating = self.checked_rating();
        let id = self.place_id.filter(|id| !id.is_empty())?;

        Some(PlaceResult {
            name: self.name.unwrap_or_default(),
            location,
            categories: self.types,
            rating,
            rating_count: self.user_ratings_total,
            open_now: self.opening_hours.and_then(|h| h.open_now),
            address: self.vicinity.or(self.formatted_address),
            id,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPhoto {
    pub photo_reference: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReview {
    #[serde(default)]
    pub author_name: String,
    pub rating: Option<f64>,
    #[serde(default)]
    pub text: String,
    /// Unix timestamp in seconds
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDetails {
    #[serde(flatten)]
    pub place: RawPlace,
    pub formatted_phone_number: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub photos: Vec<RawPhoto>,
    #[serde(default)]
    pub reviews: Vec<RawReview>,
}

impl RawDetails {
    #[must_use]
    pub fn into_place_details(self) -> Option<PlaceDetails> {
        let location = self.place.location();
        let rating = self.place.checked_rating();
        let place = self.place;
        let id = place.place_id.filter(|id| !id.is_empty())?;
        let (open_now, opening_hours) = place
            .opening_hours
            .map(|h| (h.open_now, h.weekday_text))
            .unwrap_or_default();

        Some(PlaceDetails {
            id,
            name: place.name.unwrap_or_default(),
            location,
            address: place.formatted_address.or(place.vicinity),
            phone: self.formatted_phone_number,
            website: self.website,
            rating,
            rating_count: place.user_ratings_total,
            open_now,
            opening_hours,
            photo_references: self
                .photos
                .into_iter()
                .take(PlaceDetails::MAX_PHOTOS)
                .map(|p| p.photo_reference)
                .collect(),
            reviews: self
                .reviews
                .into_iter()
                .map(|r| PlaceReview {
                    author: r.author_name,
                    rating: r.rating,
                    text: r.text,
                    written_at: r.time.and_then(|t| DateTime::from_timestamp(t, 0)),
                })
                .collect(),
            categories: place.types,
        })
    }
}

/// Response of the details endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsEnvelope {
    pub status: ProviderStatus,
    pub result: Option<RawDetails>,
    pub error_message: Option<String>,
}
