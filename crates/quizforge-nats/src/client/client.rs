//! NATS client wrapper and connection management.

use std::time::Duration;

use async_nats::{Client, jetstream};
use tokio::time::timeout;

use super::config::NatsConfig;
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// NATS client wrapper with connection management
#[derive(Debug, Clone)]
pub struct NatsClient {
    client: Client,
    jetstream: jetstream::Context,
    config: NatsConfig,
}

impl NatsClient {
    /// Create a new NATS client and connect
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            servers = ?config.servers,
            name = %config.name,
            "Connecting to NATS servers"
        );

        let connecting =
            async_nats::connect_with_options(config.servers.join(","), config.connect_options());
        let client = timeout(config.connect_timeout, connecting)
            .await
            .map_err(|_| Error::timeout(config.connect_timeout))?
            .map_err(|e| Error::Connection(Box::new(e)))?;

        let jetstream = jetstream::new(client.clone());

        let server_info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server_host = %server_info.host,
            server_version = %server_info.version,
            "Successfully connected to NATS"
        );

        Ok(Self {
            client,
            jetstream,
            config,
        })
    }

    /// Get the underlying NATS client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the JetStream context
    pub fn jetstream(&self) -> &jetstream::Context {
        &self.jetstream
    }

    /// Get the configuration
    pub fn config(&self) -> &NatsConfig {
        &self.config
    }

    /// Flush pending operations and release the connection
    pub async fn close(&self) -> Result<()> {
        timeout(Duration::from_secs(10), self.client.flush())
            .await
            .map_err(|_| Error::timeout(Duration::from_secs(10)))?
            .map_err(|e| Error::Connection(Box::new(e)))?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            "NATS connection flushed and released"
        );
        Ok(())
    }
}
