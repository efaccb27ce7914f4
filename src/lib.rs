//! `VenueScout` - Nightlife and dining venue discovery around a map position
//!
//! This library provides the search pipeline behind the map screen: paginated
//! place queries, multi-category aggregation, radius and rating filtering,
//! and sequence-guarded publication of results.

pub mod aggregator;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod geo;
pub mod models;
pub mod places;
pub mod radius_filter;

// Re-export core types for public API
pub use aggregator::{Aggregator, dedup_by_id};
pub use config::VenueScoutConfig;
pub use coordinator::{RequestCoordinator, SearchOutcome, SearchPolicy, SearchView};
pub use error::VenueScoutError;
pub use geo::distance_meters;
pub use models::{
    FilterSelection, GeoPoint, PlaceDetails, PlaceResult, PlaceReview, SearchCategory,
    SearchRequest,
};
pub use places::{PlaceProvider, PlaceSearchClient, PlacesError};
pub use radius_filter::RadiusFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, VenueScoutError>;
