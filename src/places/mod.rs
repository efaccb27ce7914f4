//! Places provider integration
//!
//! This module talks to the external place-search provider:
//! - Wire format of search and details responses
//! - The HTTP provider for the Google Places web service
//! - Cursor pagination with provider-mandated delays and not-ready retries
//! - A search client exposing nearby, text and details lookups

pub mod client;
pub mod error;
pub mod google;
pub mod pagination;
pub mod response;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

use crate::models::GeoPoint;

pub use client::PlaceSearchClient;
pub use error::{PlacesError, Result};
pub use google::GooglePlacesProvider;
pub use pagination::{PaginationPolicy, PaginationStats, Paginator, Sleeper, TokioSleeper};
pub use response::{DetailsEnvelope, ProviderStatus, RawPlace, SearchPage};

/// Shape of a paginated search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchKind {
    /// Nearby search restricted to one provider place type
    Nearby { category_code: String },
    /// Free text search biased towards the origin
    Text { query: String },
}

/// Parameters of the first page of a search; later pages only need the cursor
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub kind: SearchKind,
    pub origin: GeoPoint,
    pub radius_meters: f64,
}

impl PageQuery {
    #[must_use]
    pub fn nearby(origin: GeoPoint, category_code: &str, radius_meters: f64) -> Self {
        Self {
            kind: SearchKind::Nearby {
                category_code: category_code.to_string(),
            },
            origin,
            radius_meters,
        }
    }

    #[must_use]
    pub fn text(query: &str, origin: GeoPoint, radius_meters: f64) -> Self {
        Self {
            kind: SearchKind::Text {
                query: query.to_string(),
            },
            origin,
            radius_meters,
        }
    }
}

/// Raw access to the provider endpoints.
///
/// Implementations report transport and decoding failures as errors and
/// hand provider statuses back untouched; interpreting them is the
/// paginator's job.
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Fetch one page. With a cursor the query parameters are ignored.
    async fn fetch_page(&self, query: &PageQuery, cursor: Option<&str>) -> Result<SearchPage>;

    async fn fetch_details(&self, place_id: &str) -> Result<DetailsEnvelope>;
}
