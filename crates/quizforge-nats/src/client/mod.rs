//! NATS client connection management and configuration.

mod client;
mod config;

pub use client::NatsClient;
pub use config::{NatsConfig, NatsCredentials};
