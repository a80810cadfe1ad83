use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;

use crate::merge::DedupPolicy;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Query shaping and aggregation behaviour
    #[serde(default)]
    pub search: SearchSettings,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Merge priority of external providers (first to last)
    #[serde(default = "default_provider_order")]
    pub provider_order: Vec<String>,
    /// Local recipe store
    #[serde(default)]
    pub local: LocalConfig,
    /// Consumer-side query hook
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchSettings {
    /// Upper bound for `pageSize`; larger requests are clamped silently
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Page size used when the request does not carry one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// How records from different sources are recognised as duplicates
    #[serde(default)]
    pub dedup_policy: DedupPolicy,
    /// Per-provider request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            default_page_size: default_page_size(),
            dedup_policy: DedupPolicy::default(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for a specific recipe provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is queried at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// API key (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Application id (Edamam specific)
    pub app_id: Option<String>,
    /// Base URL for API endpoint (for proxies and tests)
    pub base_url: Option<String>,
    /// Largest number of results the provider hands out per request
    pub max_results: Option<usize>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: None,
            app_id: None,
            base_url: None,
            max_results: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocalConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// JSON file holding an array of recipes
    pub path: Option<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Where the `/search` endpoint lives
    #[serde(default = "default_client_base_url")]
    pub base_url: String,
    /// Quiet period before a free-text change is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// How long cached responses stay fresh
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_client_base_url(),
            debounce_ms: default_debounce_ms(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchSettings::default(),
            providers: HashMap::new(),
            provider_order: default_provider_order(),
            local: LocalConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_max_page_size() -> usize {
    50
}

fn default_page_size() -> usize {
    10
}

fn default_timeout() -> u64 {
    10
}

fn default_enabled() -> bool {
    true
}

fn default_provider_order() -> Vec<String> {
    vec!["spoonacular".to_string(), "edamam".to_string()]
}

fn default_client_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_cache_ttl_seconds() -> u64 {
    300
}

impl SearchConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPES__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPES__PROVIDERS__SPOONACULAR__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Parse configuration from a TOML string, ignoring the environment
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

/// Load configuration from file and environment variables
///
/// See [`SearchConfig::load`] for the lookup order.
pub fn load_config() -> Result<SearchConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPES__SEARCH__MAX_PAGE_SIZE
        .add_source(
            Environment::with_prefix("RECIPES")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("provider_order")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
