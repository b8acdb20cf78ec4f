//! NATS connection configuration and credentials.

use std::time::Duration;

use async_nats::ConnectOptions;

/// Configuration for NATS connections
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URL(s)
    pub servers: Vec<String>,
    /// Connection name for debugging
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum reconnection attempts
    pub max_reconnects: Option<usize>,
    /// Reconnection delay, doubled per attempt up to 30 seconds
    pub reconnect_delay: Duration,
    /// Ping interval for keep-alive
    pub ping_interval: Duration,
    /// Authentication credentials
    pub credentials: Option<NatsCredentials>,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://127.0.0.1:4222".to_string()],
            name: "quizforge-nats".to_string(),
            connect_timeout: Duration::from_secs(10),
            max_reconnects: Some(10),
            reconnect_delay: Duration::from_secs(2),
            ping_interval: Duration::from_secs(30),
            credentials: None,
        }
    }
}

impl NatsConfig {
    /// Create a new configuration with the given server URL
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            servers: vec![server_url.into()],
            ..Default::default()
        }
    }

    /// Add multiple server URLs for clustering
    pub fn with_servers(mut self, servers: Vec<String>) -> Self {
        self.servers = servers;
        self
    }

    /// Set connection name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set authentication credentials
    pub fn with_credentials(mut self, credentials: NatsCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Builds the connect options this configuration describes.
    pub(crate) fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new()
            .name(&self.name)
            .connection_timeout(self.connect_timeout)
            .ping_interval(self.ping_interval);

        if let Some(max_reconnects) = self.max_reconnects {
            options = options.max_reconnects(max_reconnects);
        }

        let base_delay_ms = self.reconnect_delay.as_millis() as u64;
        options = options.reconnect_delay_callback(move |attempts| {
            Duration::from_millis(std::cmp::min(
                base_delay_ms * 2_u64.pow(attempts as u32),
                30_000,
            ))
        });

        match &self.credentials {
            Some(NatsCredentials::UserPassword { user, pass }) => {
                options.user_and_password(user.clone(), pass.clone())
            }
            Some(NatsCredentials::Token { token }) => options.token(token.clone()),
            None => options,
        }
    }
}

/// Authentication credentials for a NATS connection
#[derive(Debug, Clone)]
pub enum NatsCredentials {
    /// Username and password authentication
    UserPassword { user: String, pass: String },
    /// Token-based authentication
    Token { token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = NatsConfig::default();
        assert_eq!(config.servers, vec!["nats://127.0.0.1:4222".to_string()]);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn builder_methods() {
        let config = NatsConfig::new("nats://queue:4222")
            .with_name("worker-1")
            .with_connect_timeout(Duration::from_secs(5))
            .with_credentials(NatsCredentials::Token {
                token: "secret".to_string(),
            });

        assert_eq!(config.servers, vec!["nats://queue:4222".to_string()]);
        assert_eq!(config.name, "worker-1");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert!(matches!(
            config.credentials,
            Some(NatsCredentials::Token { .. })
        ));
    }
}
