use crate::config::ProviderConfig;
use crate::error::SearchError;
use crate::model::{NormalizedRecipe, RecipeSource, SearchQuery};
use crate::providers::{
    decode_title, http_client, tag_set, text_field, whole_number, RecipeProvider,
};
use crate::query::repeated;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.edamam.com";
/// Recipes v2 returns fixed pages of 20 hits
const DEFAULT_MAX_RESULTS: usize = 20;

/// Values Edamam accepts for its `diet` parameter; every other diet tag is
/// sent as a `health` label.
const DIET_LABELS: [&str; 6] = [
    "balanced",
    "high-fiber",
    "high-protein",
    "low-carb",
    "low-fat",
    "low-sodium",
];

pub struct EdamamProvider {
    client: Client,
    app_id: Option<String>,
    app_key: Option<String>,
    base_url: String,
    max_results: usize,
}

impl EdamamProvider {
    /// Create a new Edamam provider from configuration
    ///
    /// Needs both an application id and key; without them searches return nothing.
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Self {
        let app_id = config
            .app_id
            .clone()
            .or_else(|| std::env::var("EDAMAM_APP_ID").ok())
            .filter(|id| !id.trim().is_empty());
        let app_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("EDAMAM_APP_KEY").ok())
            .filter(|key| !key.trim().is_empty());

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        EdamamProvider {
            client: http_client(timeout),
            app_id,
            app_key,
            base_url,
            max_results: config.max_results.unwrap_or(DEFAULT_MAX_RESULTS).max(1),
        }
    }

    #[doc(hidden)]
    pub fn with_base_url(
        app_id: Option<String>,
        app_key: Option<String>,
        base_url: String,
    ) -> Self {
        EdamamProvider {
            client: Client::new(),
            app_id,
            app_key,
            base_url,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    #[doc(hidden)]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Query parameters for recipes v2, excluding credentials
    fn params(query: &SearchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("type", "public".to_string())];
        if let Some(text) = &query.text {
            params.push(("q", text.clone()));
        }
        params.extend(repeated("cuisineType", &query.cuisines));
        params.extend(repeated("mealType", &query.meal_types));

        let (diets, health) = split_diets(&query.diets);
        params.extend(repeated("diet", &diets));
        params.extend(repeated("health", &health));

        if let Some(minutes) = query.max_ready_minutes {
            params.push(("time", format!("1-{}", minutes)));
        }
        params
    }
}

/// Split diet tags into Edamam's `diet` enum values and `health` labels
fn split_diets(tags: &BTreeSet<String>) -> (BTreeSet<String>, BTreeSet<String>) {
    tags.iter()
        .map(|tag| tag.replace(' ', "-"))
        .partition(|tag| DIET_LABELS.contains(&tag.as_str()))
}

/// Edamam identifies recipes by URI, e.g.
/// `http://www.edamam.com/ontologies/edamam.owl#recipe_b79327d05b8e5b838ad6cfd9576b30b6`
fn recipe_id(uri: &str) -> String {
    match uri.rsplit_once("#recipe_") {
        Some((_, id)) if !id.is_empty() => id.to_string(),
        _ => uri.to_string(),
    }
}

/// Map one hit; `None` when it lacks a uri or label
fn normalize(hit: &Value) -> Option<NormalizedRecipe> {
    let recipe_json = &hit["recipe"];
    let id = text_field(&recipe_json["uri"]).map(|uri| recipe_id(&uri))?;
    let title = text_field(&recipe_json["label"]).map(|t| decode_title(&t))?;

    let mut recipe = NormalizedRecipe::new(id, title, RecipeSource::Edamam);
    recipe.image = text_field(&recipe_json["image"]);
    // totalTime is 0 when Edamam does not know it
    recipe.ready_in_minutes = whole_number(&recipe_json["totalTime"]).filter(|n| *n > 0);
    recipe.servings = whole_number(&recipe_json["yield"]).filter(|n| *n > 0);
    recipe.cuisines = tag_set(&recipe_json["cuisineType"]);
    recipe.diets = tag_set(&recipe_json["dietLabels"]);
    recipe.diets.extend(tag_set(&recipe_json["healthLabels"]));
    // composite labels like "lunch/dinner"
    recipe.meal_types = tag_set(&recipe_json["mealType"])
        .iter()
        .flat_map(|meal| meal.split('/'))
        .map(str::trim)
        .filter(|meal| !meal.is_empty())
        .map(str::to_string)
        .collect();
    recipe.url = text_field(&recipe_json["url"]);
    Some(recipe)
}

#[async_trait]
impl RecipeProvider for EdamamProvider {
    fn provider_name(&self) -> &str {
        "edamam"
    }

    fn source(&self) -> RecipeSource {
        RecipeSource::Edamam
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecipe>, SearchError> {
        let (app_id, app_key) = match (self.app_id.as_deref(), self.app_key.as_deref()) {
            (Some(id), Some(key)) => (id, key),
            _ => return Err(SearchError::NotConfigured(self.provider_name().to_string())),
        };

        let response = self
            .client
            .get(format!("{}/api/recipes/v2", self.base_url))
            .query(&[("app_id", app_id), ("app_key", app_key)])
            .query(&Self::params(query))
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
        debug!("edamam count={}", response_body["count"]);

        // the whole batch is kept; the aggregator pages the merged list
        let recipes = response_body["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .filter_map(normalize)
                    .take(self.max_results)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(recipes)
    }
}
