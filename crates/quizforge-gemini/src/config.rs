//! Gemini client configuration.

use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Default API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Default generation model.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default request timeout; generation over a full document is slow.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default sampling temperature for question generation.
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key used for all requests.
    pub api_key: String,
    /// Generation model identifier.
    pub model: String,
    /// API base URL.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Sampling temperature for generation.
    pub temperature: f64,
}

impl GeminiConfig {
    /// Creates a configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timeout: DEFAULT_TIMEOUT,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Set the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config("api key is empty"));
        }
        if self.model.trim().is_empty() {
            return Err(Error::config("model is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = GeminiConfig::new("key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let config = GeminiConfig::new("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_overrides_apply() {
        let config = GeminiConfig::new("key")
            .with_model("gemini-2.5-pro")
            .with_timeout(Duration::from_secs(30));
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
