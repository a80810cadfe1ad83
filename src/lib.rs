//! Recipe search aggregation.
//!
//! One query goes out to a local recipe store and to external providers
//! (Spoonacular, Edamam) at the same time. Their results are normalized,
//! merged in a fixed order with duplicates removed, and paginated.
//!
//! # Example
//! ```no_run
//! use recipe_search::{InMemoryRecipeStore, RecipeAggregator, SearchQuery};
//!
//! # async fn run() {
//! let aggregator = RecipeAggregator::builder()
//!     .local(InMemoryRecipeStore::default())
//!     .build();
//! let response = aggregator.search_recipes(&SearchQuery::default()).await;
//! println!("{} recipes", response.total);
//! # }
//! ```

pub mod aggregator;
pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod local;
pub mod merge;
pub mod model;
pub mod providers;
pub mod query;
pub mod server;

pub use aggregator::RecipeAggregator;
pub use builder::RecipeAggregatorBuilder;
pub use client::{QueryHook, SearchState};
pub use config::SearchConfig;
pub use error::{ClientError, SearchError};
pub use local::{InMemoryRecipeStore, JsonFileStore, LocalRecipeSource};
pub use merge::{merge, DedupPolicy};
pub use model::{
    NormalizedRecipe, RecipeSource, ResponseSource, SearchQuery, SearchResponse, SourceScope,
};
pub use providers::{EdamamProvider, ProviderFactory, RecipeProvider, SpoonacularProvider};
pub use query::{translate, PageLimits, SearchParams, UiFilterState};

/// Translate `filters` and run one search with everything `config` describes
pub async fn search_with_config(
    config: &SearchConfig,
    filters: &UiFilterState,
) -> SearchResponse {
    let query = translate(filters, &PageLimits::from(&config.search));
    RecipeAggregator::from_config(config)
        .search_recipes(&query)
        .await
}
