use std::sync::Arc;

use futures::Stream;
use tracing::{debug, info, instrument, warn};

use super::pagination::{PaginationPolicy, Paginator, Sleeper, TokioSleeper};
use super::{GooglePlacesProvider, PageQuery, PlaceProvider, ProviderStatus};
use crate::config::PlacesConfig;
use crate::models::{GeoPoint, PlaceDetails, PlaceResult};

/// Nearby, text and details lookups against one provider.
///
/// None of the lookups fail: provider errors are logged and degrade to the
/// results collected so far, or `None` for details.
#[derive(Clone)]
pub struct PlaceSearchClient {
    provider: Arc<dyn PlaceProvider>,
    sleeper: Arc<dyn Sleeper>,
    policy: PaginationPolicy,
}

impl PlaceSearchClient {
    pub fn new(provider: Arc<dyn PlaceProvider>) -> Self {
        Self {
            provider,
            sleeper: Arc::new(TokioSleeper),
            policy: PaginationPolicy::default(),
        }
    }

    /// Client for the Google Places web service described by `config`
    pub fn from_config(config: &PlacesConfig) -> crate::Result<Self> {
        let provider = GooglePlacesProvider::new(config)?;
        Ok(Self::new(Arc::new(provider)).with_policy(PaginationPolicy::from(config)))
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PaginationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &PaginationPolicy {
        &self.policy
    }

    /// Paginator for an arbitrary query
    pub fn paginate(&self, query: PageQuery) -> Paginator<'_> {
        Paginator::new(
            self.provider.as_ref(),
            self.sleeper.as_ref(),
            &self.policy,
            query,
        )
    }

    /// Lazily page through a nearby search for one category code
    pub fn search_nearby_stream(
        &self,
        origin: &GeoPoint,
        category_code: &str,
        radius_meters: f64,
    ) -> impl Stream<Item = PlaceResult> + Send + '_ {
        self.paginate(PageQuery::nearby(*origin, category_code, radius_meters))
            .into_stream()
    }

    /// All pages of a nearby search for one category code
    #[instrument(skip(self, origin), fields(category = category_code))]
    pub async fn search_nearby(
        &self,
        origin: &GeoPoint,
        category_code: &str,
        radius_meters: f64,
    ) -> Vec<PlaceResult> {
        let (results, stats) = self
            .paginate(PageQuery::nearby(*origin, category_code, radius_meters))
            .collect_all()
            .await;
        debug!(
            "Nearby '{}' search: {} results over {} pages ({} calls)",
            category_code, stats.results, stats.pages, stats.fetches
        );
        results
    }

    /// Lazily page through a free text search
    pub fn search_by_text_stream(
        &self,
        query: &str,
        origin: &GeoPoint,
        radius_meters: f64,
    ) -> impl Stream<Item = PlaceResult> + Send + '_ {
        self.paginate(PageQuery::text(query, *origin, radius_meters))
            .into_stream()
    }

    /// All pages of a free text search
    #[instrument(skip(self, origin))]
    pub async fn search_by_text(
        &self,
        query: &str,
        origin: &GeoPoint,
        radius_meters: f64,
    ) -> Vec<PlaceResult> {
        let (results, stats) = self
            .paginate(PageQuery::text(query, *origin, radius_meters))
            .collect_all()
            .await;
        info!(
            "Text search '{}' found {} results over {} pages",
            query, stats.results, stats.pages
        );
        results
    }

    /// Full record of one place, `None` on any failure
    #[instrument(skip(self))]
    pub async fn get_details(&self, place_id: &str) -> Option<PlaceDetails> {
        match self.provider.fetch_details(place_id).await {
            Ok(envelope) if envelope.status == ProviderStatus::Ok => {
                let details = envelope.result.and_then(|raw| raw.into_place_details());
                if details.is_none() {
                    warn!("Details for {} came back without a usable place", place_id);
                }
                details
            }
            Ok(envelope) => {
                warn!(
                    "Details lookup for {} failed with status {}",
                    place_id, envelope.status
                );
                None
            }
            Err(e) => {
                warn!("Details request for {} failed: {}", place_id, e);
                None
            }
        }
    }
}
