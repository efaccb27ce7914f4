//! Multi-category fan-out over the places client
//!
//! The provider accepts a single place type per nearby query, so a search
//! over several categories issues one paginated query per distinct provider
//! code and merges the results in category order.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use tracing::{debug, info, instrument};

use crate::models::{GeoPoint, PlaceResult, SearchCategory};
use crate::places::PlaceSearchClient;

/// Progress observer, called with the completed fraction in `0.0..=1.0`
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// Runs one nearby query per category and merges the results
pub struct Aggregator<'a> {
    client: &'a PlaceSearchClient,
}

impl<'a> Aggregator<'a> {
    #[must_use]
    pub fn new(client: &'a PlaceSearchClient) -> Self {
        Self { client }
    }

    /// Query categories one after another.
    ///
    /// Progress is reported after each category; a category whose provider
    /// code was already queried completes immediately.
    #[instrument(skip(self, origin, on_progress), fields(categories = categories.len()))]
    pub async fn aggregate_by_categories(
        &self,
        origin: &GeoPoint,
        categories: &[SearchCategory],
        radius_meters: f64,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Vec<PlaceResult> {
        let categories = resolve_categories(categories);
        let total = categories.len();
        let mut queried = HashSet::new();
        let mut merged = Vec::new();

        for (done, category) in categories.iter().enumerate() {
            let code = category.provider_code();
            if queried.insert(code) {
                let results = self.client.search_nearby(origin, code, radius_meters).await;
                debug!("{} returned {} results", category, results.len());
                merged.extend(results);
            } else {
                debug!("{} shares provider code '{}', already queried", category, code);
            }

            if let Some(report) = on_progress {
                report((done + 1) as f64 / total as f64);
            }
        }

        let unique = dedup_by_id(merged);
        info!("Aggregated {} unique places over {} categories", unique.len(), total);
        unique
    }

    /// Query all categories at once.
    ///
    /// Results are merged in category order regardless of completion order,
    /// so the output equals [`Aggregator::aggregate_by_categories`].
    #[instrument(skip(self, origin, on_progress), fields(categories = categories.len()))]
    pub async fn aggregate_concurrently(
        &self,
        origin: &GeoPoint,
        categories: &[SearchCategory],
        radius_meters: f64,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Vec<PlaceResult> {
        let categories = resolve_categories(categories);
        let total = categories.len();

        // distinct codes in first-occurrence order, with how many categories share each
        let mut codes: Vec<(&'static str, usize)> = Vec::new();
        for category in &categories {
            let code = category.provider_code();
            match codes.iter_mut().find(|(c, _)| *c == code) {
                Some((_, weight)) => *weight += 1,
                None => codes.push((code, 1)),
            }
        }

        let completed = AtomicUsize::new(0);
        let queries = codes.iter().map(|&(code, weight)| {
            let completed = &completed;
            async move {
                let results = self.client.search_nearby(origin, code, radius_meters).await;
                let done = completed.fetch_add(weight, Ordering::SeqCst) + weight;
                if let Some(report) = on_progress {
                    report(done as f64 / total as f64);
                }
                results
            }
        });

        let merged: Vec<PlaceResult> = join_all(queries).await.into_iter().flatten().collect();

        let unique = dedup_by_id(merged);
        info!(
            "Aggregated {} unique places over {} categories ({} concurrent queries)",
            unique.len(),
            total,
            codes.len()
        );
        unique
    }
}

/// An empty selection means the default category set
fn resolve_categories(categories: &[SearchCategory]) -> Vec<SearchCategory> {
    if categories.is_empty() {
        SearchCategory::DEFAULTS.to_vec()
    } else {
        categories.to_vec()
    }
}

/// Drop repeated ids, keeping the first occurrence and the original order
#[must_use]
pub fn dedup_by_id(results: Vec<PlaceResult>) -> Vec<PlaceResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|place| seen.insert(place.id.clone()))
        .collect()
}
