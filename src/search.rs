//! Search lifecycle: `Idle` → `Loading` → `Success` | `Failure`.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::FoodProvider;
use crate::error::SearchError;
use crate::models::{FoodSummary, SearchResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    /// Always holds at least one result.
    Success(Vec<SearchResult>),
    /// User-facing message.
    Failure(String),
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Loading)
    }

    pub fn results(&self) -> Option<&[SearchResult]> {
        match self {
            SearchState::Success(results) => Some(results),
            _ => None,
        }
    }

    /// Normalized results for display, empty unless in `Success`.
    pub fn summaries(&self) -> Vec<FoodSummary> {
        self.results()
            .map(|r| r.iter().map(SearchResult::summary).collect())
            .unwrap_or_default()
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SearchState::Failure(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: SearchState,
    /// Bumped by every submission; only the latest may write a final state.
    generation: u64,
}

/// Drives searches against a [`FoodProvider`] and holds the visible state.
///
/// Clones share state, so submissions may overlap across tasks. A response
/// that arrives after a newer submission started is dropped.
#[derive(Clone)]
pub struct SearchController {
    provider: Arc<dyn FoodProvider>,
    inner: Arc<Mutex<Inner>>,
}

impl SearchController {
    pub fn new(provider: Arc<dyn FoodProvider>) -> Self {
        Self {
            provider,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub async fn state(&self) -> SearchState {
        self.inner.lock().await.state.clone()
    }

    /// Run one search and return the state current once it settles.
    ///
    /// Empty queries are forwarded to the provider like any other.
    pub async fn submit_query(&self, query: &str) -> SearchState {
        let query = query.trim();

        let generation = {
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            inner.state = SearchState::Loading;
            inner.generation
        };
        debug!(generation, query, "search started");

        let outcome = match self.provider.search(query).await {
            Ok(results) if results.is_empty() => Err(SearchError::NoResults),
            other => other,
        };

        let next = match outcome {
            Ok(results) => {
                debug!(generation, count = results.len(), "search succeeded");
                SearchState::Success(results)
            }
            Err(e) => {
                match e {
                    SearchError::NoResults => {
                        debug!(generation, query, "search returned no results")
                    }
                    SearchError::Malformed(_) => {
                        warn!(generation, error = %e, "malformed search response")
                    }
                    _ => warn!(generation, error = %e, "search request failed"),
                }
                SearchState::Failure(e.user_message().to_string())
            }
        };

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!(
                generation,
                current = inner.generation,
                "discarding stale search response"
            );
            return inner.state.clone();
        }
        inner.state = next.clone();
        next
    }
}
