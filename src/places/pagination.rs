//! Cursor pagination against the places provider
//!
//! The provider returns at most 20 results per page and up to three pages
//! per query. A next-page cursor only becomes valid a short while after it
//! is issued; presenting it too early yields `INVALID_REQUEST`, which is
//! retried after a backoff without counting against the page cap.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, warn};

use super::{PageQuery, PlaceProvider, ProviderStatus};
use crate::config::PlacesConfig;
use crate::models::PlaceResult;

/// Suspends the pagination between provider calls
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Limits and delays applied while following cursors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationPolicy {
    /// Successful pages fetched per query at most
    pub page_cap: u32,
    /// Wait before presenting a freshly issued cursor
    pub page_delay: Duration,
    /// Wait before retrying a cursor the provider reported as not ready
    pub not_ready_backoff: Duration,
    /// Not-ready retries allowed for a single page
    pub max_not_ready_retries: u32,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            page_cap: 3,
            page_delay: Duration::from_millis(2000),
            not_ready_backoff: Duration::from_millis(1500),
            max_not_ready_retries: 5,
        }
    }
}

impl From<&PlacesConfig> for PaginationPolicy {
    fn from(config: &PlacesConfig) -> Self {
        Self {
            page_cap: config.page_cap,
            page_delay: Duration::from_millis(config.page_delay_ms),
            not_ready_backoff: Duration::from_millis(config.not_ready_backoff_ms),
            max_not_ready_retries: config.max_not_ready_retries,
        }
    }
}

/// Counters describing one paginated query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationStats {
    /// Provider calls issued, retries included
    pub fetches: u32,
    /// Successful pages, the quantity limited by the page cap
    pub pages: u32,
    pub not_ready_retries: u32,
    pub results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageState {
    Fetching { cursor: Option<String> },
    AwaitingCursorDelay { cursor: String },
    RetryingNotReady { cursor: String },
    Exhausted,
    Failed,
}

/// Drives one query through its pages.
///
/// Every failure ends the query with whatever was already yielded; nothing
/// is reported to the caller beyond the log and [`Paginator::failed`].
pub struct Paginator<'a> {
    provider: &'a dyn PlaceProvider,
    sleeper: &'a dyn Sleeper,
    policy: &'a PaginationPolicy,
    query: PageQuery,
    state: PageState,
    stats: PaginationStats,
    page_retries: u32,
}

impl<'a> Paginator<'a> {
    pub fn new(
        provider: &'a dyn PlaceProvider,
        sleeper: &'a dyn Sleeper,
        policy: &'a PaginationPolicy,
        query: PageQuery,
    ) -> Self {
        Self {
            provider,
            sleeper,
            policy,
            query,
            state: PageState::Fetching { cursor: None },
            stats: PaginationStats::default(),
            page_retries: 0,
        }
    }

    #[must_use]
    pub fn stats(&self) -> PaginationStats {
        self.stats
    }

    /// Whether the query ended on an error rather than running out of pages
    #[must_use]
    pub fn failed(&self) -> bool {
        self.state == PageState::Failed
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, PageState::Exhausted | PageState::Failed)
    }

    /// Results of the next successful page, `None` once the query is over
    pub async fn next_page(&mut self) -> Option<Vec<PlaceResult>> {
        loop {
            match std::mem::replace(&mut self.state, PageState::Exhausted) {
                PageState::Fetching { cursor } => {
                    if let Some(page) = self.fetch(cursor).await {
                        return Some(page);
                    }
                    if self.is_finished() {
                        return None;
                    }
                }
                PageState::AwaitingCursorDelay { cursor } => {
                    self.sleeper.sleep(self.policy.page_delay).await;
                    self.state = PageState::Fetching {
                        cursor: Some(cursor),
                    };
                }
                PageState::RetryingNotReady { cursor } => {
                    if self.page_retries >= self.policy.max_not_ready_retries {
                        warn!(
                            "Page cursor still not ready after {} retries, keeping {} results",
                            self.page_retries, self.stats.results
                        );
                        self.state = PageState::Failed;
                        return None;
                    }
                    self.page_retries += 1;
                    self.stats.not_ready_retries += 1;
                    self.sleeper.sleep(self.policy.not_ready_backoff).await;
                    self.state = PageState::Fetching {
                        cursor: Some(cursor),
                    };
                }
                finished @ (PageState::Exhausted | PageState::Failed) => {
                    self.state = finished;
                    return None;
                }
            }
        }
    }

    /// Issue one provider call and move to the follow-up state
    async fn fetch(&mut self, cursor: Option<String>) -> Option<Vec<PlaceResult>> {
        self.stats.fetches += 1;
        let page = match self.provider.fetch_page(&self.query, cursor.as_deref()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    "Places request failed, keeping {} results: {}",
                    self.stats.results, e
                );
                self.state = PageState::Failed;
                return None;
            }
        };

        match (page.status, cursor) {
            (ProviderStatus::Ok, _) => {
                self.stats.pages += 1;
                self.page_retries = 0;
                let results: Vec<PlaceResult> = page
                    .results
                    .into_iter()
                    .filter_map(|raw| raw.into_place_result())
                    .collect();
                self.stats.results += results.len();
                debug!(
                    "Page {} returned {} results",
                    self.stats.pages,
                    results.len()
                );

                self.state = match page.next_page_token {
                    Some(token) if self.stats.pages < self.policy.page_cap => {
                        PageState::AwaitingCursorDelay { cursor: token }
                    }
                    _ => PageState::Exhausted,
                };
                Some(results)
            }
            (ProviderStatus::ZeroResults, _) => {
                debug!("Provider reported zero results");
                self.state = PageState::Exhausted;
                None
            }
            (ProviderStatus::InvalidRequest, Some(cursor)) => {
                debug!("Page cursor not ready yet");
                self.state = PageState::RetryingNotReady { cursor };
                None
            }
            (status, _) => {
                warn!(
                    "Places search failed with status {}{}, keeping {} results",
                    status,
                    page.error_message
                        .map(|m| format!(" ({m})"))
                        .unwrap_or_default(),
                    self.stats.results
                );
                self.state = PageState::Failed;
                None
            }
        }
    }

    /// Drain every page
    pub async fn collect_all(mut self) -> (Vec<PlaceResult>, PaginationStats) {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await {
            all.extend(page);
        }
        (all, self.stats)
    }

    /// Lazily yield results page by page
    pub fn into_stream(self) -> impl Stream<Item = PlaceResult> + Send + 'a {
        stream::unfold(self, |mut pager| async move {
            pager
                .next_page()
                .await
                .map(|page| (stream::iter(page), pager))
        })
        .flatten()
    }
}
