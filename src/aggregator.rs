//! Aggregation façade: concurrent fan-out, merge, then paginate.
//!
//! The local store and every provider are queried at the same time. All of
//! them are awaited before merging, and the merge always runs in the declared
//! order (local first, then providers in configuration order), so which
//! source answers first never changes the output.

use futures::future::join_all;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::builder::RecipeAggregatorBuilder;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::local::{JsonFileStore, LocalRecipeSource};
use crate::merge::{merge, DedupPolicy};
use crate::model::{NormalizedRecipe, ResponseSource, SearchQuery, SearchResponse};
use crate::providers::{ProviderFactory, RecipeProvider};

pub struct RecipeAggregator {
    pub(crate) local: Option<Arc<dyn LocalRecipeSource>>,
    pub(crate) providers: Vec<Box<dyn RecipeProvider>>,
    pub(crate) dedup_policy: DedupPolicy,
    pub(crate) timeout: Duration,
}

impl RecipeAggregator {
    /// Creates a new builder for assembling an aggregator by hand
    pub fn builder() -> RecipeAggregatorBuilder {
        RecipeAggregatorBuilder::default()
    }

    /// Assemble the aggregator described by `config`
    ///
    /// The local store is only attached when enabled and given a path.
    pub fn from_config(config: &SearchConfig) -> Self {
        let mut builder = Self::builder()
            .providers(ProviderFactory::from_config(config))
            .dedup_policy(config.search.dedup_policy)
            .timeout(Duration::from_secs(config.search.timeout));

        match (&config.local.path, config.local.enabled) {
            (Some(path), true) => builder = builder.local(JsonFileStore::new(path)),
            (None, true) => debug!("No local recipe file configured"),
            _ => {}
        }

        builder.build()
    }

    pub fn dedup_policy(&self) -> DedupPolicy {
        self.dedup_policy
    }

    /// Names of the external providers in merge order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.provider_name()).collect()
    }

    /// Search every source in scope and return one page of merged results
    ///
    /// Never fails: a source that errors or times out contributes nothing.
    pub async fn search_recipes(&self, query: &SearchQuery) -> SearchResponse {
        let scope = query.source_scope;

        let local_search = async {
            match &self.local {
                Some(local) if scope.includes_local() => {
                    self.search_local(local.as_ref(), query).await
                }
                _ => Vec::new(),
            }
        };

        let external_search = async {
            if scope.includes_external() {
                join_all(
                    self.providers
                        .iter()
                        .map(|provider| self.search_provider(provider.as_ref(), query)),
                )
                .await
            } else {
                Vec::new()
            }
        };

        let (local_results, external_results) = futures::join!(local_search, external_search);

        let mut lists = Vec::with_capacity(external_results.len() + 1);
        lists.push(local_results);
        lists.extend(external_results);

        let merged = merge(lists, self.dedup_policy);
        paginate(merged, query, scope.response_source())
    }

    async fn search_local(
        &self,
        local: &dyn LocalRecipeSource,
        query: &SearchQuery,
    ) -> Vec<NormalizedRecipe> {
        match tokio::time::timeout(self.timeout, local.search(query)).await {
            Ok(Ok(recipes)) => recipes,
            Ok(Err(e)) => {
                warn!("Local recipe store failed: {}", e);
                Vec::new()
            }
            Err(_) => {
                let err = SearchError::Timeout("local".to_string());
                warn!("{} after {:?}", err, self.timeout);
                Vec::new()
            }
        }
    }

    async fn search_provider(
        &self,
        provider: &dyn RecipeProvider,
        query: &SearchQuery,
    ) -> Vec<NormalizedRecipe> {
        match tokio::time::timeout(self.timeout, provider.search(query)).await {
            Ok(recipes) => recipes,
            Err(_) => {
                let err = SearchError::Timeout(provider.provider_name().to_string());
                warn!("{} after {:?}", err, self.timeout);
                Vec::new()
            }
        }
    }
}

/// Cut one page out of the merged list
fn paginate(
    merged: Vec<NormalizedRecipe>,
    query: &SearchQuery,
    source: ResponseSource,
) -> SearchResponse {
    let total = merged.len();
    let results = merged
        .into_iter()
        .skip(query.offset)
        .take(query.page_size)
        .collect();

    SearchResponse {
        results,
        total,
        source,
    }
}
