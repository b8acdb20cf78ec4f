//! External service configuration.

use quizforge_gemini::GeminiConfig;
use quizforge_nats::{NatsClient, NatsConfig};

use crate::service::AuthKeys;
use crate::{Error, Result};

/// Configuration for every external service the server talks to.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// NATS server URL.
    pub nats_url: String,
    /// Connection name reported to the NATS server.
    pub nats_client_name: String,
    /// Gemini API key.
    pub gemini_api_key: String,
    /// Gemini model override; the adapter default applies when `None`.
    pub gemini_model: Option<String>,
    /// HMAC secret access tokens are verified against.
    pub auth_secret: String,
}

impl ServiceConfig {
    /// Creates a configuration from the required connection parameters.
    pub fn new(
        nats_url: impl Into<String>,
        gemini_api_key: impl Into<String>,
        auth_secret: impl Into<String>,
    ) -> Self {
        Self {
            nats_url: nats_url.into(),
            nats_client_name: "quizforge-server".to_string(),
            gemini_api_key: gemini_api_key.into(),
            gemini_model: None,
            auth_secret: auth_secret.into(),
        }
    }

    /// Set the Gemini model.
    pub fn with_gemini_model(mut self, model: impl Into<String>) -> Self {
        self.gemini_model = Some(model.into());
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.nats_url.trim().is_empty() {
            return Err(Error::config("NATS URL is empty"));
        }
        if self.gemini_api_key.trim().is_empty() {
            return Err(Error::config("Gemini API key is empty"));
        }
        if self.auth_secret.len() < 16 {
            return Err(Error::config("auth secret must be at least 16 bytes"));
        }
        Ok(())
    }

    /// Builds the NATS connection configuration.
    pub fn nats_config(&self) -> NatsConfig {
        NatsConfig::new(self.nats_url.clone()).with_name(self.nats_client_name.clone())
    }

    /// Connects to NATS.
    pub async fn connect_nats(&self) -> Result<NatsClient> {
        Ok(NatsClient::connect(self.nats_config()).await?)
    }

    /// Builds the Gemini client configuration.
    pub fn gemini_config(&self) -> GeminiConfig {
        let config = GeminiConfig::new(self.gemini_api_key.clone());
        match &self.gemini_model {
            Some(model) => config.with_model(model.clone()),
            None => config,
        }
    }

    /// Builds the token verification keys.
    pub fn auth_keys(&self) -> AuthKeys {
        AuthKeys::from_secret(self.auth_secret.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServiceConfig {
        ServiceConfig::new(
            "nats://127.0.0.1:4222",
            "test-api-key",
            "0123456789abcdef0123456789abcdef",
        )
    }

    #[test]
    fn valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn short_auth_secret_is_rejected() {
        let mut config = config();
        config.auth_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn model_override_applies() {
        let config = config().with_gemini_model("gemini-2.5-pro");
        assert_eq!(config.gemini_config().model, "gemini-2.5-pro");
    }
}
