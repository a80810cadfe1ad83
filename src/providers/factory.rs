use crate::config::{ProviderConfig, SearchConfig};
use crate::error::SearchError;
use crate::providers::{EdamamProvider, RecipeProvider, SpoonacularProvider};
use log::{info, warn};
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn RecipeProvider>, SearchError> {
        if !config.enabled {
            return Err(SearchError::Disabled(provider_name.to_string()));
        }

        match provider_name {
            "spoonacular" => Ok(Box::new(SpoonacularProvider::new(config, timeout))),
            "edamam" => Ok(Box::new(EdamamProvider::new(config, timeout))),
            _ => Err(SearchError::UnknownProvider(provider_name.to_string())),
        }
    }

    /// Build every provider named in `provider_order`, in that order
    ///
    /// Providers without a config section are built from defaults so that
    /// environment credentials alone are enough. Disabled and unknown
    /// providers are skipped.
    pub fn from_config(config: &SearchConfig) -> Vec<Box<dyn RecipeProvider>> {
        let timeout = Duration::from_secs(config.search.timeout);
        let mut providers = Vec::new();

        for provider_name in &config.provider_order {
            let provider_config = config
                .providers
                .get(provider_name)
                .cloned()
                .unwrap_or_default();

            match Self::create(provider_name, &provider_config, timeout) {
                Ok(provider) => {
                    info!("Added '{}' to provider chain", provider_name);
                    providers.push(provider);
                }
                Err(SearchError::Disabled(_)) => {
                    info!("Provider '{}' disabled in configuration", provider_name);
                }
                Err(e) => {
                    warn!("Failed to initialize provider '{}': {}", provider_name, e);
                }
            }
        }

        providers
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["spoonacular", "edamam"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_provider_config() -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            api_key: Some("test-key".to_string()),
            app_id: Some("test-app".to_string()),
            base_url: None,
            max_results: None,
        }
    }

    #[test]
    fn test_create_spoonacular_provider() {
        let config = create_test_provider_config();
        let provider =
            ProviderFactory::create("spoonacular", &config, Duration::from_secs(5)).unwrap();
        assert_eq!(provider.provider_name(), "spoonacular");
    }

    #[test]
    fn test_create_edamam_provider() {
        let config = create_test_provider_config();
        let provider = ProviderFactory::create("edamam", &config, Duration::from_secs(5)).unwrap();
        assert_eq!(provider.provider_name(), "edamam");
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = create_test_provider_config();
        let result = ProviderFactory::create("unknown", &config, Duration::from_secs(5));
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Unknown provider"));
        }
    }

    #[test]
    fn test_create_disabled_provider() {
        let mut config = create_test_provider_config();
        config.enabled = false;

        let result = ProviderFactory::create("spoonacular", &config, Duration::from_secs(5));
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("not enabled in configuration"));
        }
    }

    #[test]
    fn test_from_config_keeps_order_and_skips_bad_entries() {
        let mut config = SearchConfig::default();
        config.provider_order = vec![
            "edamam".to_string(),
            "nope".to_string(),
            "spoonacular".to_string(),
        ];

        let providers = ProviderFactory::from_config(&config);
        let names: Vec<&str> = providers.iter().map(|p| p.provider_name()).collect();
        assert_eq!(names, vec!["edamam", "spoonacular"]);
    }

    #[test]
    fn test_from_config_skips_disabled() {
        let mut config = SearchConfig::default();
        let mut disabled = create_test_provider_config();
        disabled.enabled = false;
        config.providers.insert("spoonacular".to_string(), disabled);

        let providers = ProviderFactory::from_config(&config);
        let names: Vec<&str> = providers.iter().map(|p| p.provider_name()).collect();
        assert_eq!(names, vec!["edamam"]);
    }

    #[test]
    fn test_available_providers() {
        let providers = ProviderFactory::available_providers();
        assert_eq!(providers.len(), 2);
        assert!(providers.contains(&"spoonacular"));
        assert!(providers.contains(&"edamam"));
    }
}
