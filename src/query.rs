//! Translation from UI filter state to [`SearchQuery`] and from a query to
//! wire parameters.

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::config::SearchSettings;
use crate::model::{SearchQuery, SourceScope};

/// Filter state as the UI holds it
///
/// Everything is optional and loosely typed; [`translate`] does the clamping.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiFilterState {
    pub search: String,
    pub cuisines: Vec<String>,
    /// Merged into `cuisines`; the engine has a single cuisine axis
    pub ethnicities: Vec<String>,
    pub diets: Vec<String>,
    pub meal_types: Vec<String>,
    pub max_ready_minutes: Option<i64>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Raw offset; wins over `page` when present
    pub offset: Option<i64>,
    pub source: Option<String>,
}

/// Page size bounds applied during translation
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub max_page_size: usize,
    pub default_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        PageLimits {
            max_page_size: 50,
            default_page_size: 10,
        }
    }
}

impl From<&SearchSettings> for PageLimits {
    fn from(settings: &SearchSettings) -> Self {
        PageLimits {
            max_page_size: settings.max_page_size.max(1),
            default_page_size: settings.default_page_size.max(1),
        }
    }
}

/// Build a [`SearchQuery`] from UI filter state
///
/// Never fails: bad values are clamped or dropped.
pub fn translate(state: &UiFilterState, limits: &PageLimits) -> SearchQuery {
    let text = Some(state.search.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let mut cuisines = normalize_tags(&state.cuisines);
    cuisines.extend(normalize_tags(&state.ethnicities));

    let page_size = match state.page_size {
        Some(size) if size > 0 => (size as usize).min(limits.max_page_size),
        _ => limits.default_page_size.min(limits.max_page_size),
    }
    .max(1);

    let (page, offset) = match state.offset {
        Some(offset) if offset >= 0 => {
            let offset = offset as usize;
            (offset / page_size + 1, offset)
        }
        _ => {
            let page = state.page.unwrap_or(1).max(1) as usize;
            (page, (page - 1).saturating_mul(page_size))
        }
    };

    let max_ready_minutes = state
        .max_ready_minutes
        .filter(|minutes| *minutes > 0)
        .map(|minutes| minutes.min(u32::MAX as i64) as u32);

    SearchQuery {
        text,
        cuisines,
        diets: normalize_tags(&state.diets),
        meal_types: normalize_tags(&state.meal_types),
        max_ready_minutes,
        page,
        page_size,
        offset,
        source_scope: state
            .source
            .as_deref()
            .map(SourceScope::parse_lenient)
            .unwrap_or_default(),
    }
}

/// Trim, lower-case and dedupe tags, dropping empty ones
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> BTreeSet<String> {
    tags.iter()
        .map(|tag| tag.as_ref().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Split a comma-joined parameter, trimming each element
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tags with commas, or `None` when there are none
pub fn comma_joined(tags: &BTreeSet<String>) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.iter().cloned().collect::<Vec<_>>().join(","))
    }
}

/// Encode tags as one `key=value` pair per tag
pub fn repeated<'a>(key: &'a str, tags: &BTreeSet<String>) -> Vec<(&'a str, String)> {
    tags.iter().map(|tag| (key, tag.clone())).collect()
}

/// Query string of `GET /search`, as sent by clients
///
/// Numbers arrive as strings so that garbage is dropped instead of rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub cuisines: Option<String>,
    pub ethnicities: Option<String>,
    pub diets: Option<String>,
    pub meal_types: Option<String>,
    pub max_ready_minutes: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub offset: Option<String>,
    pub source: Option<String>,
}

fn parse_int(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

impl From<SearchParams> for UiFilterState {
    fn from(params: SearchParams) -> Self {
        let list = |value: &Option<String>| value.as_deref().map(split_list).unwrap_or_default();

        UiFilterState {
            search: params.q.clone().unwrap_or_default(),
            cuisines: list(&params.cuisines),
            ethnicities: list(&params.ethnicities),
            diets: list(&params.diets),
            meal_types: list(&params.meal_types),
            max_ready_minutes: parse_int(&params.max_ready_minutes),
            page: parse_int(&params.page),
            page_size: parse_int(&params.page_size),
            offset: parse_int(&params.offset),
            source: params.source,
        }
    }
}

/// Encode a query as `/search` parameters, skipping inactive filters
pub fn to_query_pairs(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();

    if let Some(text) = &query.text {
        pairs.push(("q", text.clone()));
    }
    if let Some(cuisines) = comma_joined(&query.cuisines) {
        pairs.push(("cuisines", cuisines));
    }
    if let Some(diets) = comma_joined(&query.diets) {
        pairs.push(("diets", diets));
    }
    if let Some(meal_types) = comma_joined(&query.meal_types) {
        pairs.push(("mealTypes", meal_types));
    }
    if let Some(minutes) = query.max_ready_minutes {
        pairs.push(("maxReadyMinutes", minutes.to_string()));
    }
    pairs.push(("pageSize", query.page_size.to_string()));
    if query.offset > 0 {
        pairs.push(("offset", query.offset.to_string()));
    }
    if query.source_scope != SourceScope::All {
        pairs.push(("source", query.source_scope.as_param().to_string()));
    }

    pairs
}
