use thiserror::Error;

/// Errors that can occur while querying a recipe source
///
/// Adapters never hand these to the aggregator; they are logged and turned
/// into an empty contribution at the adapter boundary.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Transport failure talking to a provider
    #[error("Request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("{provider} responded with status {status}")]
    ProviderStatus { provider: String, status: u16 },

    /// Provider answered with a body we could not read
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Provider has no credentials configured
    #[error("Provider '{0}' is not configured")]
    NotConfigured(String),

    /// Provider name is not one we know how to build
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Provider is switched off in configuration
    #[error("Provider '{0}' is not enabled in configuration")]
    Disabled(String),

    /// Provider did not answer within the request timeout
    #[error("Provider '{0}' timed out")]
    Timeout(String),

    /// Local recipe store could not be loaded
    #[error("Local store error: {0}")]
    StoreError(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::ParseError(err.to_string())
    }
}

/// Errors seen by the client-side query hook
#[derive(Error, Debug)]
pub enum ClientError {
    /// The search endpoint could not be reached
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The search endpoint answered with a non-success status
    #[error("Search endpoint responded with status {0}")]
    StatusError(u16),

    /// The body was not a search envelope
    #[error("Failed to decode search response: {0}")]
    DecodeError(String),
}
