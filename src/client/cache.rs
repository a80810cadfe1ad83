use moka::future::Cache;
use std::time::Duration;

use crate::model::{SearchQuery, SearchResponse};

const MAX_ENTRIES: u64 = 256;

/// Deterministic key for a query
///
/// Fields serialize in declaration order and tag sets are ordered, so two
/// queries that compare equal always produce the same key.
pub fn cache_key(query: &SearchQuery) -> String {
    serde_json::to_string(query).unwrap_or_else(|_| format!("{:?}", query))
}

/// Responses keyed by [`cache_key`], evicted only when their TTL runs out
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<String, SearchResponse>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        ResultCache {
            inner: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<SearchResponse> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, response: SearchResponse) {
        self.inner.insert(key, response).await;
    }
}
