//! In-memory provider and sleeper for unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{
    DetailsEnvelope, PageQuery, PlaceProvider, PlacesError, ProviderStatus, Result, SearchKind,
    SearchPage, Sleeper,
};

/// Replays scripted pages per query; unscripted calls get `ZERO_RESULTS`.
///
/// Queries are keyed by category code for nearby searches and by
/// `text:<query>` for text searches.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Result<SearchPage>>>>,
    details: Mutex<HashMap<String, DetailsEnvelope>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedProvider {
    pub(crate) fn script(self, key: &str, pages: Vec<SearchPage>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .extend(pages.into_iter().map(Ok));
        self
    }

    pub(crate) fn script_error(self, key: &str, error: PlacesError) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Err(error));
        self
    }

    pub(crate) fn details(self, place_id: &str, envelope: DetailsEnvelope) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(place_id.to_string(), envelope);
        self
    }

    /// Calls for `key` block until the returned gate is notified
    pub(crate) fn gate(&self, key: &str) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    pub(crate) fn call_count(&self, key: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k == key)
            .count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn cursors(&self, key: &str) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, cursor)| cursor.clone())
            .collect()
    }

    fn key(query: &PageQuery) -> String {
        match &query.kind {
            SearchKind::Nearby { category_code } => category_code.clone(),
            SearchKind::Text { query } => format!("text:{query}"),
        }
    }
}

#[async_trait]
impl PlaceProvider for ScriptedProvider {
    async fn fetch_page(&self, query: &PageQuery, cursor: Option<&str>) -> Result<SearchPage> {
        let key = Self::key(query);
        self.calls
            .lock()
            .unwrap()
            .push((key.clone(), cursor.map(ToString::to_string)));

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.scripts
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(SearchPage::with_status(ProviderStatus::ZeroResults)))
    }

    async fn fetch_details(&self, place_id: &str) -> Result<DetailsEnvelope> {
        self.details
            .lock()
            .unwrap()
            .get(place_id)
            .cloned()
            .ok_or_else(|| PlacesError::NetworkError(format!("no script for {place_id}")))
    }
}

/// Records requested sleeps and returns immediately
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
