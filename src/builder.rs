use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::RecipeAggregator;
use crate::local::LocalRecipeSource;
use crate::merge::DedupPolicy;
use crate::providers::RecipeProvider;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for assembling a [`RecipeAggregator`]
#[derive(Default)]
pub struct RecipeAggregatorBuilder {
    local: Option<Arc<dyn LocalRecipeSource>>,
    providers: Vec<Box<dyn RecipeProvider>>,
    dedup_policy: DedupPolicy,
    timeout: Option<Duration>,
}

impl RecipeAggregatorBuilder {
    /// Set the local recipe store, searched ahead of every provider
    ///
    /// # Example
    /// ```
    /// use recipe_search::{InMemoryRecipeStore, RecipeAggregator};
    ///
    /// let aggregator = RecipeAggregator::builder()
    ///     .local(InMemoryRecipeStore::default())
    ///     .build();
    /// ```
    pub fn local(mut self, store: impl LocalRecipeSource + 'static) -> Self {
        self.local = Some(Arc::new(store));
        self
    }

    /// Share an already-built local store
    pub fn shared_local(mut self, store: Arc<dyn LocalRecipeSource>) -> Self {
        self.local = Some(store);
        self
    }

    /// Append an external provider; providers merge in the order they are added
    ///
    /// # Example
    /// ```
    /// use recipe_search::{RecipeAggregator, SpoonacularProvider};
    ///
    /// let aggregator = RecipeAggregator::builder()
    ///     .provider(SpoonacularProvider::with_base_url(
    ///         Some("api-key".to_string()),
    ///         "https://api.spoonacular.com".to_string(),
    ///     ))
    ///     .build();
    /// ```
    pub fn provider(mut self, provider: impl RecipeProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Append several boxed providers, keeping their order
    pub fn providers(mut self, providers: Vec<Box<dyn RecipeProvider>>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Choose how duplicates across sources are detected
    ///
    /// # Example
    /// ```
    /// use recipe_search::{DedupPolicy, RecipeAggregator};
    ///
    /// let aggregator = RecipeAggregator::builder()
    ///     .dedup_policy(DedupPolicy::SourceQualifiedOrTitle)
    ///     .build();
    /// ```
    pub fn dedup_policy(mut self, policy: DedupPolicy) -> Self {
        self.dedup_policy = policy;
        self
    }

    /// Bound each source's search; a source that overruns contributes nothing
    ///
    /// # Example
    /// ```
    /// use recipe_search::RecipeAggregator;
    /// use std::time::Duration;
    ///
    /// let aggregator = RecipeAggregator::builder()
    ///     .timeout(Duration::from_secs(5))
    ///     .build();
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn build(self) -> RecipeAggregator {
        RecipeAggregator {
            local: self.local,
            providers: self.providers,
            dedup_policy: self.dedup_policy,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}
