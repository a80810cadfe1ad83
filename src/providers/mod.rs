mod edamam;
mod factory;
mod spoonacular;

pub use edamam::EdamamProvider;
pub use factory::ProviderFactory;
pub use spoonacular::SpoonacularProvider;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::SearchError;
use crate::model::{NormalizedRecipe, RecipeSource, SearchQuery};

/// Unified trait for all external recipe providers
///
/// All response-shape knowledge stays inside the implementation; callers only
/// ever see [`NormalizedRecipe`] values.
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Get the provider name (e.g., "spoonacular", "edamam")
    fn provider_name(&self) -> &str;

    /// Source tag stamped on every record this provider returns
    fn source(&self) -> RecipeSource;

    /// Query the provider, reporting failures
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecipe>, SearchError>;

    /// Query the provider; failures are logged and yield no results
    ///
    /// Every returned record carries this provider's [`RecipeProvider::source`].
    async fn search(&self, query: &SearchQuery) -> Vec<NormalizedRecipe> {
        match self.fetch(query).await {
            Ok(mut recipes) => {
                let source = self.source();
                for recipe in &mut recipes {
                    recipe.source = source;
                }
                debug!(
                    "{} returned {} recipes",
                    self.provider_name(),
                    recipes.len()
                );
                recipes
            }
            Err(SearchError::NotConfigured(name)) => {
                debug!("Skipping {}: no credentials configured", name);
                Vec::new()
            }
            Err(e) => {
                warn!("Provider {} failed: {}", self.provider_name(), e);
                Vec::new()
            }
        }
    }
}

/// HTTP client with a request timeout
///
/// Falls back to a default client, which has no timeout, if the builder fails.
pub(crate) fn http_client(timeout: Duration) -> Client {
    match Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(
                "Failed to build HTTP client with {:?} timeout, using defaults: {}",
                timeout, e
            );
            Client::new()
        }
    }
}

/// Lower-cased, trimmed tags from a JSON array of strings; anything else is
/// treated as "no tags"
pub(crate) fn tag_set(value: &Value) -> BTreeSet<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|tag| tag.trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// A non-negative whole number from a JSON number, rounding floats
pub(crate) fn whole_number(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= u32::MAX as f64)
        .map(|n| n.round() as u32)
}

/// A non-empty string field
pub(crate) fn text_field(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Ids arrive as numbers from some providers and strings from others
pub(crate) fn id_field(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        other => text_field(other),
    }
}

/// Titles sometimes carry HTML entities
pub(crate) fn decode_title(title: &str) -> String {
    decode_html_entities(title).trim().to_string()
}
