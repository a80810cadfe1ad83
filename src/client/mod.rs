//! Client-side query hook.
//!
//! Holds the UI filter state, turns it into queries and keeps a [`SearchState`]
//! current. Free-text edits are debounced while filter changes go out at once.
//! Responses are cached by query, and a response that no longer matches the
//! latest request is dropped instead of overwriting newer state.

mod cache;
mod debounce;
mod transport;

pub use cache::{cache_key, ResultCache};
pub use debounce::Debouncer;
pub use transport::{HttpTransport, SearchTransport};

use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

use crate::config::ClientConfig;
use crate::model::SearchResponse;
use crate::query::{translate, PageLimits, UiFilterState};

/// What the UI should currently show
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Nothing requested yet
    Idle,
    Loading,
    /// At least one result
    Loaded(SearchResponse),
    /// The search completed and matched nothing
    Empty,
    /// Network or decode failure
    Error(String),
}

impl From<SearchResponse> for SearchState {
    fn from(response: SearchResponse) -> Self {
        if response.results.is_empty() && response.total == 0 {
            SearchState::Empty
        } else {
            SearchState::Loaded(response)
        }
    }
}

struct HookInner {
    transport: Arc<dyn SearchTransport>,
    cache: ResultCache,
    limits: PageLimits,
    filters: Mutex<UiFilterState>,
    generation: AtomicU64,
    state: watch::Sender<SearchState>,
}

impl HookInner {
    fn filters(&self) -> MutexGuard<'_, UiFilterState> {
        self.filters.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A response is current only if nothing was dispatched after it and the
    /// filters still translate to the same query
    fn is_current(&self, generation: u64, key: &str) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
            && cache_key(&translate(&self.filters(), &self.limits)) == key
    }

    async fn dispatch(&self) {
        let query = translate(&self.filters(), &self.limits);
        let key = cache_key(&query);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(cached) = self.cache.get(&key).await {
            debug!("cache hit for {}", key);
            if self.is_current(generation, &key) {
                self.state.send_replace(cached.into());
            }
            return;
        }

        self.state.send_replace(SearchState::Loading);
        let result = self.transport.fetch(&query).await;

        if !self.is_current(generation, &key) {
            debug!("discarding stale response for {}", key);
            return;
        }

        match result {
            Ok(response) => {
                self.cache.insert(key, response.clone()).await;
                self.state.send_replace(response.into());
            }
            Err(e) => {
                warn!("Search request failed: {}", e);
                self.state.send_replace(SearchState::Error(e.to_string()));
            }
        }
    }
}

/// Keeps search results in step with UI filter state
pub struct QueryHook {
    inner: Arc<HookInner>,
    debouncer: Debouncer,
}

impl QueryHook {
    pub fn new(
        transport: Arc<dyn SearchTransport>,
        config: &ClientConfig,
        limits: PageLimits,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);

        QueryHook {
            inner: Arc::new(HookInner {
                transport,
                cache: ResultCache::new(Duration::from_secs(config.cache_ttl_seconds)),
                limits,
                filters: Mutex::new(UiFilterState::default()),
                generation: AtomicU64::new(0),
                state,
            }),
            debouncer: Debouncer::new(Duration::from_millis(config.debounce_ms)),
        }
    }

    /// Hook talking HTTP to `config.base_url`
    pub fn over_http(config: &ClientConfig, limits: PageLimits) -> Self {
        let transport = HttpTransport::new(config.base_url.clone(), Duration::from_secs(30));
        Self::new(Arc::new(transport), config, limits)
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn filters(&self) -> UiFilterState {
        self.inner.filters().clone()
    }

    /// Update the free text; the request goes out once typing pauses
    pub fn set_text(&self, text: impl Into<String>) {
        {
            let mut filters = self.inner.filters();
            filters.search = text.into();
            filters.page = None;
            filters.offset = None;
        }

        let inner = self.inner.clone();
        self.debouncer.schedule(async move { inner.dispatch().await });
    }

    /// Change any non-text filter and search right away
    ///
    /// A pending debounced text search is folded into this one.
    pub async fn set_filters<F>(&self, update: F)
    where
        F: FnOnce(&mut UiFilterState),
    {
        {
            let mut filters = self.inner.filters();
            update(&mut *filters);
            filters.page = None;
            filters.offset = None;
        }

        self.debouncer.cancel();
        self.inner.dispatch().await;
    }

    /// Move to another page of the current search
    pub async fn set_page(&self, page: i64) {
        {
            let mut filters = self.inner.filters();
            filters.page = Some(page);
            filters.offset = None;
        }

        self.debouncer.cancel();
        self.inner.dispatch().await;
    }

    /// Re-run the current search, served from cache when fresh
    pub async fn refresh(&self) {
        self.debouncer.cancel();
        self.inner.dispatch().await;
    }
}
