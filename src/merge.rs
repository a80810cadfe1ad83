//! Stable merge of per-source result lists.
//!
//! Lists are walked in priority order and the first record seen for a dedup
//! key wins. Output keeps the order of first appearance; nothing is re-scored.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::model::{NormalizedRecipe, RecipeSource};

/// How two records are recognised as the same recipe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// `(source, id)`; ids from different providers never collide
    #[default]
    SourceQualified,
    /// `(source, id)`, plus records from different sources whose normalized
    /// titles match
    SourceQualifiedOrTitle,
    /// `id` alone, regardless of source
    BareId,
}

/// Identity of a record under a [`DedupPolicy`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Qualified(RecipeSource, String),
    Bare(String),
}

impl DedupKey {
    pub fn for_recipe(recipe: &NormalizedRecipe, policy: DedupPolicy) -> Self {
        match policy {
            DedupPolicy::BareId => DedupKey::Bare(recipe.id.clone()),
            DedupPolicy::SourceQualified | DedupPolicy::SourceQualifiedOrTitle => {
                DedupKey::Qualified(recipe.source, recipe.id.clone())
            }
        }
    }
}

/// Lower-case a title and keep only alphanumeric words, single-spaced
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merge lists given in priority order into one deduplicated list
///
/// # Arguments
/// * `lists` - Per-source results, highest priority first
/// * `policy` - Dedup key policy
///
/// # Returns
/// Every record whose key was not seen earlier, in order of first appearance
pub fn merge(lists: Vec<Vec<NormalizedRecipe>>, policy: DedupPolicy) -> Vec<NormalizedRecipe> {
    let mut seen_keys: HashSet<DedupKey> = HashSet::new();
    // normalized title -> sources that already contributed it
    let mut seen_titles: HashMap<String, Vec<RecipeSource>> = HashMap::new();
    let mut merged = Vec::new();

    for recipe in lists.into_iter().flatten() {
        let key = DedupKey::for_recipe(&recipe, policy);
        if seen_keys.contains(&key) {
            continue;
        }

        if policy == DedupPolicy::SourceQualifiedOrTitle {
            let title = normalize_title(&recipe.title);
            if !title.is_empty() {
                let sources = seen_titles.entry(title).or_default();
                if sources.iter().any(|source| *source != recipe.source) {
                    continue;
                }
                if !sources.contains(&recipe.source) {
                    sources.push(recipe.source);
                }
            }
        }

        seen_keys.insert(key);
        merged.push(recipe);
    }

    merged
}
