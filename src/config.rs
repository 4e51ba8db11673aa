//! Configuration for the Ember backend clients

use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while assembling configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid backend URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("api_key cannot be empty")]
    EmptyKey,

    #[error("{0} environment variable not found")]
    MissingVar(&'static str),
}

/// Connection details for the Ember backend project.
///
/// Load these from environment variables or a secure config source rather
/// than hardcoding them.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub api_key: String,
}

impl BackendConfig {
    /// Creates a new configuration, validating the URL
    pub fn new(url_str: &str, api_key: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(url_str)?;
        if api_key.is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
        })
    }

    /// Attempts to create configuration from `EMBER_BACKEND_URL` and
    /// `EMBER_API_KEY`
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("EMBER_BACKEND_URL")
            .map_err(|_| ConfigError::MissingVar("EMBER_BACKEND_URL"))?;
        let key = std::env::var("EMBER_API_KEY")
            .map_err(|_| ConfigError::MissingVar("EMBER_API_KEY"))?;
        Self::new(&url, &key)
    }

    /// Base URL without a trailing slash, ready for path concatenation
    pub(crate) fn endpoint(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }
}

/// Options applied to every backend client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Value sent as the `X-Client-Info` header
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            client_info: format!("ember-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the client info header value
    pub fn with_client_info(mut self, value: &str) -> Self {
        self.client_info = value.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_valid() {
        let config = BackendConfig::new("http://localhost:54321", "anon-key").unwrap();
        assert_eq!(config.base_url.to_string(), "http://localhost:54321/");
        assert_eq!(config.api_key, "anon-key");
        assert_eq!(config.endpoint(), "http://localhost:54321");
    }

    #[test]
    fn config_new_invalid_url() {
        let config = BackendConfig::new("not a valid url", "anon-key");
        assert!(matches!(config, Err(ConfigError::UrlParse(_))));
    }

    #[test]
    fn config_new_empty_key() {
        let config = BackendConfig::new("http://localhost:54321", "");
        assert!(matches!(config, Err(ConfigError::EmptyKey)));
    }
}
