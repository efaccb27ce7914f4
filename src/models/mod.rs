//! Data models for the venue search pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates
//! - Category: Venue categories and their provider codes
//! - Place: Search results and venue details
//! - Request: The search request issued by the map screen

pub mod category;
pub mod location;
pub mod place;
pub mod request;

// Re-export all public types for convenient access
pub use category::{FilterSelection, SearchCategory};
pub use location::GeoPoint;
pub use place::{PlaceDetails, PlaceResult, PlaceReview};
pub use request::SearchRequest;
