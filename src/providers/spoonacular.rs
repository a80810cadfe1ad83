use crate::config::ProviderConfig;
use crate::error::SearchError;
use crate::model::{NormalizedRecipe, RecipeSource, SearchQuery};
use crate::providers::{
    decode_title, http_client, id_field, tag_set, text_field, whole_number, RecipeProvider,
};
use crate::query::comma_joined;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";
/// complexSearch refuses `number` above this
const DEFAULT_MAX_RESULTS: usize = 100;

pub struct SpoonacularProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    max_results: usize,
}

impl SpoonacularProvider {
    /// Create a new Spoonacular provider from configuration
    ///
    /// A missing key is not an error; the provider just returns nothing.
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Self {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("SPOONACULAR_API_KEY").ok())
            .filter(|key| !key.trim().is_empty());

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        SpoonacularProvider {
            client: http_client(timeout),
            api_key,
            base_url,
            max_results: config.max_results.unwrap_or(DEFAULT_MAX_RESULTS).max(1),
        }
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        SpoonacularProvider {
            client: Client::new(),
            api_key,
            base_url,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    #[doc(hidden)]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Query parameters for complexSearch, excluding the key
    ///
    /// Always asks for the full candidate batch from the start so the merged
    /// total does not depend on which page is being viewed.
    fn params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("number", self.max_results.to_string()),
            ("offset", "0".to_string()),
            ("addRecipeInformation", "true".to_string()),
        ];
        if let Some(text) = &query.text {
            params.push(("query", text.clone()));
        }
        if let Some(cuisines) = comma_joined(&query.cuisines) {
            params.push(("cuisine", cuisines));
        }
        if let Some(diets) = comma_joined(&query.diets) {
            params.push(("diet", diets));
        }
        if let Some(meal_types) = comma_joined(&query.meal_types) {
            params.push(("type", meal_types));
        }
        if let Some(minutes) = query.max_ready_minutes {
            params.push(("maxReadyTime", minutes.to_string()));
        }
        params
    }
}

/// Map one complexSearch result; `None` when it lacks an id or title
fn normalize(item: &Value) -> Option<NormalizedRecipe> {
    let id = id_field(&item["id"])?;
    let title = text_field(&item["title"]).map(|t| decode_title(&t))?;

    let mut recipe = NormalizedRecipe::new(id, title, RecipeSource::Spoonacular);
    recipe.image = text_field(&item["image"]);
    recipe.ready_in_minutes = whole_number(&item["readyInMinutes"]);
    recipe.servings = whole_number(&item["servings"]).filter(|n| *n > 0);
    recipe.cuisines = tag_set(&item["cuisines"]);
    recipe.diets = tag_set(&item["diets"]);
    recipe.meal_types = tag_set(&item["dishTypes"]);
    recipe.rating = item["spoonacularScore"].as_f64();
    recipe.url = text_field(&item["sourceUrl"]);
    Some(recipe)
}

#[async_trait]
impl RecipeProvider for SpoonacularProvider {
    fn provider_name(&self) -> &str {
        "spoonacular"
    }

    fn source(&self) -> RecipeSource {
        RecipeSource::Spoonacular
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecipe>, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::NotConfigured(self.provider_name().to_string()))?;

        let response = self
            .client
            .get(format!("{}/recipes/complexSearch", self.base_url))
            .query(&[("apiKey", api_key)])
            .query(&self.params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::ProviderStatus {
                provider: self.provider_name().to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let response_body: Value = serde_json::from_str(&body)?;
        debug!("spoonacular totalResults={}", response_body["totalResults"]);

        let recipes = response_body["results"]
            .as_array()
            .map(|items| items.iter().filter_map(normalize).collect::<Vec<_>>())
            .unwrap_or_default();

        Ok(recipes.into_iter().take(self.max_results).collect())
    }
}
