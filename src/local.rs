//! Local recipe sources.
//!
//! The local store is an external collaborator; this module only defines the
//! seam it plugs into plus two small implementations used by the binary and
//! the tests.

use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeSet;
use std::path::PathBuf;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;

use crate::error::SearchError;
use crate::model::{NormalizedRecipe, RecipeSource, SearchQuery};

/// A local recipe store searched ahead of external providers
#[async_trait]
pub trait LocalRecipeSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecipe>, SearchError>;
}

/// Does `recipe` satisfy every active filter of `query`?
///
/// Within a tag field any overlap is enough; a recipe with no tags for a
/// field is kept because its tags are unknown.
pub fn matches_query(recipe: &NormalizedRecipe, query: &SearchQuery) -> bool {
    if let Some(text) = &query.text {
        let title = recipe.title.to_lowercase();
        if !text
            .to_lowercase()
            .split_whitespace()
            .all(|word| title.contains(word))
        {
            return false;
        }
    }

    let tags_match = |wanted: &BTreeSet<String>, have: &BTreeSet<String>| {
        wanted.is_empty() || have.is_empty() || !wanted.is_disjoint(have)
    };
    if !tags_match(&query.cuisines, &recipe.cuisines)
        || !tags_match(&query.diets, &recipe.diets)
        || !tags_match(&query.meal_types, &recipe.meal_types)
    {
        return false;
    }

    match (query.max_ready_minutes, recipe.ready_in_minutes) {
        (Some(max), Some(minutes)) => minutes <= max,
        _ => true,
    }
}

/// Recipes held in memory, with tags normalized on the way in
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecipeStore {
    recipes: Vec<NormalizedRecipe>,
}

impl InMemoryRecipeStore {
    pub fn new(mut recipes: Vec<NormalizedRecipe>) -> Self {
        for recipe in &mut recipes {
            recipe.normalize_tags();
        }
        InMemoryRecipeStore { recipes }
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    fn filter(&self, query: &SearchQuery) -> Vec<NormalizedRecipe> {
        self.recipes
            .iter()
            .filter(|recipe| matches_query(recipe, query))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LocalRecipeSource for InMemoryRecipeStore {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecipe>, SearchError> {
        Ok(self.filter(query))
    }
}

/// Recipes read from a JSON array on disk, loaded on first use
pub struct JsonFileStore {
    path: PathBuf,
    store: OnceCell<InMemoryRecipeStore>,
    #[cfg(test)]
    loads: AtomicUsize,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            store: OnceCell::new(),
            #[cfg(test)]
            loads: AtomicUsize::new(0),
        }
    }

    /// Load the file unless already loaded
    ///
    /// Safe to call repeatedly; concurrent callers wait on the same load. A
    /// failed load leaves the store empty so the next call tries again.
    pub async fn ensure_ready(&self) -> Result<&InMemoryRecipeStore, SearchError> {
        self.store.get_or_try_init(|| self.load()).await
    }

    pub fn is_ready(&self) -> bool {
        self.store.initialized()
    }

    async fn load(&self) -> Result<InMemoryRecipeStore, SearchError> {
        #[cfg(test)]
        self.loads.fetch_add(1, Ordering::SeqCst);
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let mut recipes: Vec<NormalizedRecipe> = serde_json::from_str(&raw)
            .map_err(|e| SearchError::StoreError(format!("{}: {}", self.path.display(), e)))?;

        for recipe in &mut recipes {
            recipe.source = RecipeSource::Local;
        }

        info!(
            "Loaded {} local recipes from {}",
            recipes.len(),
            self.path.display()
        );
        Ok(InMemoryRecipeStore::new(recipes))
    }
}

#[async_trait]
impl LocalRecipeSource for JsonFileStore {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecipe>, SearchError> {
        let store = self.ensure_ready().await?;
        let recipes = store.filter(query);
        debug!("local store matched {} recipes", recipes.len());
        Ok(recipes)
    }
}
