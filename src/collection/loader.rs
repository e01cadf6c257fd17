//! The paginated collection loader

use super::source::{Identified, PageSource, PagedQuery};
use super::types::{CollectionChange, CollectionObserver, LoadOutcome, LoaderConfig};
use crate::error::{Error, Result};
use crate::pagination::{check_stop_condition, PageRequest, Pagination};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mutable loader state, guarded by a single mutex
///
/// The lock is never held across an `.await`.
struct LoaderState<Q, T> {
    query: Option<Q>,
    items: Vec<T>,
    /// Last page whose items were appended; `None` until `start` succeeds
    last_page: Option<PageRequest>,
    pagination: Option<Pagination>,
    /// Bumped by `start` and `reset`; fetches from older generations are dropped
    generation: u64,
    /// Generation of the fetch currently running
    in_flight: Option<u64>,
    exhausted: bool,
}

impl<Q, T> Default for LoaderState<Q, T> {
    fn default() -> Self {
        Self {
            query: None,
            items: Vec::new(),
            last_page: None,
            pagination: None,
            generation: 0,
            in_flight: None,
            exhausted: false,
        }
    }
}

impl<Q, T> LoaderState<Q, T> {
    /// Forget the current collection and invalidate running fetches
    fn clear(&mut self) -> u64 {
        self.generation += 1;
        self.query = None;
        self.items.clear();
        self.last_page = None;
        self.pagination = None;
        self.in_flight = None;
        self.exhausted = false;
        self.generation
    }
}

/// Clears the in-flight marker when a fetch finishes or its future is dropped
struct InFlightGuard<'a, Q, T> {
    state: &'a Mutex<LoaderState<Q, T>>,
    generation: u64,
}

impl<Q, T> Drop for InFlightGuard<'_, Q, T> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.in_flight == Some(self.generation) {
            state.in_flight = None;
        }
    }
}

/// Loads a remote collection page by page
pub struct CollectionLoader<S: PageSource> {
    source: Arc<S>,
    config: LoaderConfig,
    state: Mutex<LoaderState<S::Query, S::Item>>,
    observer: Option<Arc<dyn CollectionObserver>>,
}

impl<S: PageSource> CollectionLoader<S> {
    /// Create a loader that fetches from `source`
    pub fn new(source: Arc<S>, config: LoaderConfig) -> Self {
        Self {
            source,
            config,
            state: Mutex::new(LoaderState::default()),
            observer: None,
        }
    }

    /// Register the observer notified after every change
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CollectionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Begin a new query: clear the collection and fetch page 1
    ///
    /// Errors from the first fetch are returned to the caller. Returns
    /// [`LoadOutcome::Discarded`], whether the fetch succeeded or not, if
    /// another `start` or a `reset` happened while the page was being
    /// fetched. The query is only recorded once its first page is in.
    pub async fn start(&self, query: S::Query) -> Result<LoadOutcome> {
        let request = PageRequest::first(query.per_page());
        request.validate()?;

        let generation = {
            let mut state = self.state.lock();
            let generation = state.clear();
            state.in_flight = Some(generation);
            generation
        };
        let guard = InFlightGuard {
            state: &self.state,
            generation,
        };

        info!(?query, per_page = request.per_page, "Starting collection");
        let fetched = self.source.fetch_page(&query, request).await;
        if !self.is_current(generation) {
            debug!(?query, "First page arrived after the query was replaced");
            return Ok(LoadOutcome::Discarded);
        }
        let page = fetched?;
        let stop = check_stop_condition(self.config.stop_condition, &page);

        let count = {
            let mut state = self.state.lock();
            if state.generation != generation {
                return Ok(LoadOutcome::Discarded);
            }
            state.query = Some(query);
            state.items = page.items;
            state.pagination = Some(page.pagination);
            state.last_page = Some(request);
            state.exhausted = stop.should_stop();
            state.in_flight = None;
            state.items.len()
        };
        drop(guard);

        debug!(count, exhausted = stop.should_stop(), "Loaded first page");
        self.notify(&CollectionChange::Reset { count });
        Ok(LoadOutcome::Appended {
            page: request.page,
            count,
        })
    }

    /// Fetch and append the next page, absorbing fetch failures
    ///
    /// Failures are logged and reported as [`LoadOutcome::Failed`]; the
    /// same page is requested again on the next call. Calling this before
    /// a successful [`start`](Self::start) returns [`Error::NotStarted`].
    pub async fn load_next_page(&self) -> Result<LoadOutcome> {
        match self.try_load_next_page().await {
            Err(Error::NotStarted) => Err(Error::NotStarted),
            Err(e) => {
                warn!(error = %e, "Failed to load next page");
                Ok(LoadOutcome::Failed)
            }
            outcome => outcome,
        }
    }

    /// Fetch and append the next page, returning fetch failures
    ///
    /// Lets callers tell "no more data" ([`LoadOutcome::Exhausted`]) from
    /// "the request failed" (`Err`).
    pub async fn try_load_next_page(&self) -> Result<LoadOutcome> {
        let (query, request, generation) = {
            let mut state = self.state.lock();
            let (Some(last_page), Some(query)) = (state.last_page, state.query.clone()) else {
                return Err(Error::NotStarted);
            };
            if state.in_flight.is_some() {
                debug!(page = last_page.page + 1, "Page fetch already in flight");
                return Ok(LoadOutcome::InFlight);
            }
            if state.exhausted {
                return Ok(LoadOutcome::Exhausted);
            }
            let generation = state.generation;
            state.in_flight = Some(generation);
            (query, last_page.next(), generation)
        };
        let guard = InFlightGuard {
            state: &self.state,
            generation,
        };

        debug!(?query, page = request.page, "Fetching next page");
        let fetched = self.source.fetch_page(&query, request).await;
        if !self.is_current(generation) {
            debug!(page = request.page, "Dropping page for a replaced query");
            return Ok(LoadOutcome::Discarded);
        }
        let page = fetched?;
        let stop = check_stop_condition(self.config.stop_condition, &page);

        let range = {
            let mut state = self.state.lock();
            if state.generation != generation {
                return Ok(LoadOutcome::Discarded);
            }
            let start = state.items.len();
            state.items.extend(page.items);
            state.pagination = Some(page.pagination);
            state.last_page = Some(request);
            state.exhausted = stop.should_stop();
            state.in_flight = None;
            start..state.items.len()
        };
        drop(guard);

        let count = range.len();
        if count == 0 && stop.should_stop() {
            info!(page = request.page, "Collection exhausted");
            return Ok(LoadOutcome::Exhausted);
        }

        debug!(page = request.page, count, "Appended page");
        if count > 0 {
            self.notify(&CollectionChange::Appended {
                page: request.page,
                range,
            });
        }
        Ok(LoadOutcome::Appended {
            page: request.page,
            count,
        })
    }

    /// Whether `item` is the last item loaded so far
    ///
    /// Compares identities; always false for an empty collection.
    pub fn is_last_item(&self, item: &S::Item) -> bool {
        self.state
            .lock()
            .items
            .last()
            .is_some_and(|last| last.id() == item.id())
    }

    /// Trailing-edge trigger: call for every item the view is about to show
    ///
    /// Loads the next page when `item` is the last loaded item and
    /// returns `None` otherwise.
    pub async fn on_item_displayed(&self, item: &S::Item) -> Result<Option<LoadOutcome>> {
        if !self.is_last_item(item) {
            return Ok(None);
        }
        self.load_next_page().await.map(Some)
    }

    /// Tear down the collection
    ///
    /// Any fetch still running will not touch the collection when it
    /// completes.
    pub fn reset(&self) {
        self.state.lock().clear();
        self.notify(&CollectionChange::Cleared);
    }

    /// Snapshot of all items loaded so far
    pub fn items(&self) -> Vec<S::Item> {
        self.state.lock().items.clone()
    }

    /// Item at `index`, if loaded
    pub fn item_at(&self, index: usize) -> Option<S::Item> {
        self.state.lock().items.get(index).cloned()
    }

    /// Number of items loaded so far
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// True when nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// True once the stop condition has been met
    pub fn is_exhausted(&self) -> bool {
        self.state.lock().exhausted
    }

    /// True while a page fetch is running
    pub fn is_loading(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Metadata of the last page appended
    pub fn pagination(&self) -> Option<Pagination> {
        self.state.lock().pagination
    }

    /// Query of the current session
    pub fn query(&self) -> Option<S::Query> {
        self.state.lock().query.clone()
    }

    /// A fetch started under `generation` may still touch the collection
    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().generation == generation
    }

    fn notify(&self, change: &CollectionChange) {
        if let Some(observer) = &self.observer {
            observer.collection_changed(change);
        }
    }
}

impl<S: PageSource> std::fmt::Debug for CollectionLoader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CollectionLoader")
            .field("config", &self.config)
            .field("query", &state.query)
            .field("items", &state.items.len())
            .field("last_page", &state.last_page)
            .field("exhausted", &state.exhausted)
            .field("loading", &state.in_flight.is_some())
            .finish_non_exhaustive()
    }
}
