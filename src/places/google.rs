use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{DetailsEnvelope, PageQuery, PlaceProvider, PlacesError, Result, SearchKind, SearchPage};
use crate::VenueScoutError;
use crate::config::PlacesConfig;

/// Google Places web service client
pub struct GooglePlacesProvider {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

impl GooglePlacesProvider {
    /// Create a new provider; fails when no API key is configured
    pub fn new(config: &PlacesConfig) -> crate::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                VenueScoutError::config(
                    "Places API key is required. Set places.api_key or VENUESCOUT_PLACES__API_KEY.",
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("VenueScout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VenueScoutError::provider(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the search URL; a cursor replaces every other parameter
    fn search_url(&self, query: &PageQuery, cursor: Option<&str>) -> Result<Url> {
        let endpoint = match query.kind {
            SearchKind::Nearby { .. } => "nearbysearch",
            SearchKind::Text { .. } => "textsearch",
        };

        let mut params: Vec<(&str, String)> = vec![("key", self.api_key.clone())];
        if let Some(token) = cursor {
            params.push(("pagetoken", token.to_string()));
        } else {
            if let SearchKind::Text { query } = &query.kind {
                params.push(("query", query.clone()));
            }
            params.push(("location", query.origin.to_query_param()));
            params.push(("radius", format!("{:.0}", query.radius_meters)));
            if let SearchKind::Nearby { category_code } = &query.kind {
                params.push(("type", category_code.clone()));
            }
        }

        self.endpoint_url(endpoint, &params)
    }

    fn details_url(&self, place_id: &str) -> Result<Url> {
        let params = [("place_id", place_id.to_string()), ("key", self.api_key.clone())];
        self.endpoint_url("details", &params)
    }

    fn endpoint_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url> {
        Url::parse_with_params(&format!("{}/{endpoint}/json", self.base_url), params)
            .map_err(|e| PlacesError::ParseError(format!("Invalid places URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return match status.as_u16() {
                401 | 403 => Err(PlacesError::AuthenticationError(
                    "Invalid or missing Places API key".to_string(),
                )),
                429 => Err(PlacesError::RateLimitError(
                    "Places API rate limit exceeded".to_string(),
                )),
                _ => Err(PlacesError::ApiError(format!(
                    "Places API error {status}: {error_text}"
                ))),
            };
        }

        response.json::<T>().await.map_err(|e| {
            PlacesError::ParseError(format!("Failed to parse places {what} response: {e}"))
        })
    }
}

#[async_trait]
impl PlaceProvider for GooglePlacesProvider {
    #[instrument(skip(self, query, cursor), fields(kind = ?query.kind, paged = cursor.is_some()))]
    async fn fetch_page(&self, query: &PageQuery, cursor: Option<&str>) -> Result<SearchPage> {
        let url = self.search_url(query, cursor)?;
        let page: SearchPage = self.get_json(url, "search").await?;
        debug!(
            "Places page: status {}, {} results, next page: {}",
            page.status,
            page.results.len(),
            page.next_page_token.is_some()
        );
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn fetch_details(&self, place_id: &str) -> Result<DetailsEnvelope> {
        let url = self.details_url(place_id)?;
        self.get_json(url, "details").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    fn provider() -> GooglePlacesProvider {
        let config = PlacesConfig {
            api_key: Some("test_places_key".to_string()),
            ..PlacesConfig::default()
        };
        GooglePlacesProvider::new(&config).unwrap()
    }

    fn query_pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn origin() -> GeoPoint {
        GeoPoint::new(-23.5505, -46.6333).unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        let result = GooglePlacesProvider::new(&PlacesConfig::default());
        assert!(matches!(result, Err(VenueScoutError::Config { .. })));
    }

    #[test]
    fn test_nearby_url() {
        let url = provider()
            .search_url(&PageQuery::nearby(origin(), "night_club", 1500.4), None)
            .unwrap();
        assert_eq!(url.path(), "/maps/api/place/nearbysearch/json");
        assert_eq!(
            query_pairs(&url),
            vec![
                ("key".to_string(), "test_places_key".to_string()),
                ("location".to_string(), "-23.5505,-46.6333".to_string()),
                ("radius".to_string(), "1500".to_string()),
                ("type".to_string(), "night_club".to_string()),
            ]
        );
    }

    #[test]
    fn test_cursor_url_only_carries_token() {
        let url = provider()
            .search_url(&PageQuery::nearby(origin(), "bar", 1000.0), Some("T1"))
            .unwrap();
        assert_eq!(
            query_pairs(&url),
            vec![
                ("key".to_string(), "test_places_key".to_string()),
                ("pagetoken".to_string(), "T1".to_string()),
            ]
        );
    }

    #[test]
    fn test_text_url() {
        let url = provider()
            .search_url(&PageQuery::text("bar aberto", origin(), 50_000.0), None)
            .unwrap();
        assert_eq!(url.path(), "/maps/api/place/textsearch/json");
        let pairs = query_pairs(&url);
        assert!(pairs.contains(&("query".to_string(), "bar aberto".to_string())));
        assert!(pairs.contains(&("radius".to_string(), "50000".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "type"));
    }

    #[test]
    fn test_details_url() {
        let url = provider().details_url("ChIJ1").unwrap();
        assert_eq!(url.path(), "/maps/api/place/details/json");
        assert!(query_pairs(&url).contains(&("place_id".to_string(), "ChIJ1".to_string())));
    }
}
