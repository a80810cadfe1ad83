use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Where a recipe came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    #[default]
    Local,
    Spoonacular,
    Edamam,
}

impl RecipeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeSource::Local => "local",
            RecipeSource::Spoonacular => "spoonacular",
            RecipeSource::Edamam => "edamam",
        }
    }
}

impl fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-agnostic recipe record
///
/// `id` is only unique within `source`. Empty tag sets mean the source did not
/// say, not that the recipe is excluded from that tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub source: RecipeSource,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub cuisines: BTreeSet<String>,
    #[serde(default)]
    pub diets: BTreeSet<String>,
    #[serde(default)]
    pub meal_types: BTreeSet<String>,
    /// Provider-defined scale, not comparable across sources
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl NormalizedRecipe {
    /// Create a record with only the required fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>, source: RecipeSource) -> Self {
        NormalizedRecipe {
            id: id.into(),
            title: title.into(),
            image: None,
            source,
            ready_in_minutes: None,
            servings: None,
            cuisines: BTreeSet::new(),
            diets: BTreeSet::new(),
            meal_types: BTreeSet::new(),
            rating: None,
            url: None,
        }
    }

    /// Lower-case and trim every tag, dropping blanks, so tags compare the
    /// same way query filters do
    pub fn normalize_tags(&mut self) {
        for tags in [&mut self.cuisines, &mut self.diets, &mut self.meal_types] {
            *tags = std::mem::take(tags)
                .into_iter()
                .map(|tag| tag.trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect();
        }
    }
}

/// Which sources a query should reach
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceScope {
    #[default]
    All,
    LocalOnly,
    ExternalOnly,
}

impl SourceScope {
    pub fn includes_local(&self) -> bool {
        matches!(self, SourceScope::All | SourceScope::LocalOnly)
    }

    pub fn includes_external(&self) -> bool {
        matches!(self, SourceScope::All | SourceScope::ExternalOnly)
    }

    /// Label reported in the response envelope
    pub fn response_source(&self) -> ResponseSource {
        match self {
            SourceScope::All => ResponseSource::All,
            SourceScope::LocalOnly => ResponseSource::Local,
            SourceScope::ExternalOnly => ResponseSource::External,
        }
    }

    /// Parse a scope leniently; anything unrecognised means `All`
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "local" | "localonly" | "local_only" => SourceScope::LocalOnly,
            "external" | "externalonly" | "external_only" => SourceScope::ExternalOnly,
            _ => SourceScope::All,
        }
    }

    /// Wire value used in the `source` request parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            SourceScope::All => "all",
            SourceScope::LocalOnly => "local",
            SourceScope::ExternalOnly => "external",
        }
    }
}

/// Normalized search request
///
/// Built by [`crate::query::translate`] and never mutated after dispatch.
/// Field order is part of the client cache key, so keep it stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub text: Option<String>,
    pub cuisines: BTreeSet<String>,
    pub diets: BTreeSet<String>,
    pub meal_types: BTreeSet<String>,
    pub max_ready_minutes: Option<u32>,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
    /// 0-based index of the first result on `page`
    pub offset: usize,
    pub source_scope: SourceScope,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            text: None,
            cuisines: BTreeSet::new(),
            diets: BTreeSet::new(),
            meal_types: BTreeSet::new(),
            max_ready_minutes: None,
            page: 1,
            page_size: 10,
            offset: 0,
            source_scope: SourceScope::All,
        }
    }
}


/// Label for which sources answered a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    All,
    Local,
    External,
}

/// Paginated search envelope returned by the aggregator and the HTTP endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<NormalizedRecipe>,
    /// Size of the merged, deduplicated set before pagination
    pub total: usize,
    pub source: ResponseSource,
}

impl SearchResponse {
    pub fn empty(source: ResponseSource) -> Self {
        SearchResponse {
            results: Vec::new(),
            total: 0,
            source,
        }
    }
}
