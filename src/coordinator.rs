//! Search orchestration for the map screen
//!
//! Every search takes a sequence number when it starts. Only the search
//! holding the latest number may publish its outcome; older searches run to
//! completion and are discarded. The sequence counter is advanced and
//! checked while holding the view channel's lock, so a commit can never
//! interleave with a newer search starting.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::aggregator::{Aggregator, dedup_by_id};
use crate::config::SearchConfig;
use crate::geo::{km_to_meters, zoom_level_for_latitude_delta};
use crate::models::{PlaceResult, SearchRequest};
use crate::places::PlaceSearchClient;
use crate::radius_filter::RadiusFilter;

/// Zoom level of a freshly opened map
pub const DEFAULT_ZOOM_LEVEL: u32 = 15;

/// Limits a nearby search must respect before any provider call is made
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPolicy {
    pub max_radius_km: f64,
    pub min_zoom_level: u32,
    /// Radius sent with free text searches
    pub text_search_radius_meters: f64,
    pub parallel_categories: bool,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchPolicy {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_radius_km: config.max_radius_km,
            min_zoom_level: config.min_zoom_level,
            text_search_radius_meters: config.text_search_radius_meters,
            parallel_categories: config.parallel_categories,
        }
    }
}

/// What the map screen renders
#[derive(Debug, Clone, Default)]
pub struct SearchView {
    /// Results of the last committed search
    pub results: Vec<PlaceResult>,
    pub progress_percent: u8,
    /// Hint shown instead of searching when a gate refused the search
    pub advisory_message: Option<String>,
    pub in_flight: bool,
    /// Sequence number of the search that produced `results`
    pub committed_seq: Option<u64>,
}

/// How a call to [`RequestCoordinator::start_search`] ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were published
    Committed { seq: u64, count: usize },
    /// A newer search started first; results were dropped
    Superseded { seq: u64 },
    /// Refused before contacting the provider
    Gated { seq: u64, advisory: String },
}

/// Owns the sequence counter, the map zoom and the published view
pub struct RequestCoordinator {
    client: PlaceSearchClient,
    policy: SearchPolicy,
    current_seq: AtomicU64,
    zoom_level: AtomicU32,
    view: watch::Sender<SearchView>,
}

impl RequestCoordinator {
    #[must_use]
    pub fn new(client: PlaceSearchClient, policy: SearchPolicy) -> Self {
        let (view, _) = watch::channel(SearchView::default());
        Self {
            client,
            policy,
            current_seq: AtomicU64::new(0),
            zoom_level: AtomicU32::new(DEFAULT_ZOOM_LEVEL),
            view,
        }
    }

    /// Receive every published change of the view
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.subscribe()
    }

    /// Snapshot of the current view
    #[must_use]
    pub fn view(&self) -> SearchView {
        self.view.borrow().clone()
    }

    #[must_use]
    pub fn current_seq(&self) -> u64 {
        self.current_seq.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn zoom_level(&self) -> u32 {
        self.zoom_level.load(Ordering::SeqCst)
    }

    pub fn update_zoom_level(&self, zoom_level: u32) {
        self.zoom_level.store(zoom_level, Ordering::SeqCst);
    }

    /// Track the map region after the user panned or zoomed
    pub fn update_viewport(&self, latitude_delta: f64) -> u32 {
        let zoom = zoom_level_for_latitude_delta(latitude_delta);
        self.update_zoom_level(zoom);
        zoom
    }

    #[must_use]
    pub fn client(&self) -> &PlaceSearchClient {
        &self.client
    }

    #[must_use]
    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    /// Run one search and publish its results if it is still the latest.
    ///
    /// A non-blank text query makes this a text search, which is never gated
    /// and skips radius and rating filtering. Otherwise the radius and zoom
    /// gates apply before any provider call.
    #[instrument(skip(self, request), fields(text = request.text_query().is_some()))]
    pub async fn start_search(&self, request: SearchRequest) -> SearchOutcome {
        let advisory = match request.text_query() {
            Some(_) => None,
            None => self.gate(&request),
        };

        let mut my_seq = 0;
        self.view.send_modify(|view| {
            my_seq = self.current_seq.fetch_add(1, Ordering::SeqCst) + 1;
            view.progress_percent = 0;
            view.advisory_message = advisory.clone();
            view.in_flight = advisory.is_none();
        });

        if let Some(advisory) = advisory {
            info!("Search {} refused: {}", my_seq, advisory);
            return SearchOutcome::Gated {
                seq: my_seq,
                advisory,
            };
        }

        let results = match request.text_query() {
            Some(query) => self.run_text(my_seq, query, &request).await,
            None => self.run_nearby(my_seq, &request).await,
        };

        self.commit(my_seq, results)
    }

    /// Advisory message when a nearby search must not run
    fn gate(&self, request: &SearchRequest) -> Option<String> {
        if request.radius_meters > km_to_meters(self.policy.max_radius_km) {
            return Some(format!(
                "Aproxime mais o mapa ou reduza o raio (máx. {}km) para ver novos locais.",
                self.policy.max_radius_km
            ));
        }
        if self.zoom_level() < self.policy.min_zoom_level {
            return Some(format!(
                "Aproxime o mapa (zoom >= {}) para carregar os estabelecimentos.",
                self.policy.min_zoom_level
            ));
        }
        None
    }

    async fn run_text(&self, seq: u64, query: &str, request: &SearchRequest) -> Vec<PlaceResult> {
        debug!("Search {} is a text search for '{}'", seq, query);
        // the provider only biases text results towards the radius; they are not filtered
        let results = self
            .client
            .search_by_text(query, &request.origin, self.policy.text_search_radius_meters)
            .await;
        dedup_by_id(results)
    }

    async fn run_nearby(&self, seq: u64, request: &SearchRequest) -> Vec<PlaceResult> {
        let report = |fraction: f64| self.publish_progress(seq, fraction);
        let aggregator = Aggregator::new(&self.client);

        let results = if self.policy.parallel_categories {
            aggregator
                .aggregate_concurrently(
                    &request.origin,
                    &request.categories,
                    request.radius_meters,
                    Some(&report),
                )
                .await
        } else {
            aggregator
                .aggregate_by_categories(
                    &request.origin,
                    &request.categories,
                    request.radius_meters,
                    Some(&report),
                )
                .await
        };

        let within =
            RadiusFilter::within_radius(results, Some(&request.origin), request.radius_meters);
        RadiusFilter::with_min_rating(within, request.min_rating)
    }

    fn is_current(&self, seq: u64) -> bool {
        self.current_seq.load(Ordering::SeqCst) == seq
    }

    fn publish_progress(&self, seq: u64, fraction: f64) {
        let percent = (fraction * 100.0).round().clamp(0.0, 100.0) as u8;
        self.view.send_if_modified(|view| {
            if !self.is_current(seq) {
                return false;
            }
            view.progress_percent = percent;
            true
        });
    }

    fn commit(&self, seq: u64, results: Vec<PlaceResult>) -> SearchOutcome {
        let count = results.len();
        let committed = self.view.send_if_modified(|view| {
            if !self.is_current(seq) {
                return false;
            }
            view.results = results;
            view.progress_percent = 100;
            view.in_flight = false;
            view.committed_seq = Some(seq);
            true
        });

        if committed {
            info!("Search {} committed {} results", seq, count);
            SearchOutcome::Committed { seq, count }
        } else {
            warn!(
                "Search {} superseded by search {}, dropping {} results",
                seq,
                self.current_seq(),
                count
            );
            SearchOutcome::Superseded { seq }
        }
    }
}
