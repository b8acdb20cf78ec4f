#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for NATS client operations.
///
/// Use this target for logging client initialization, configuration, and client-level errors.
pub const TRACING_TARGET_CLIENT: &str = "quizforge_nats::client";

/// Tracing target for NATS connection operations.
///
/// Use this target for logging connection establishment, reconnection, and connection errors.
pub const TRACING_TARGET_CONNECTION: &str = "quizforge_nats::connection";

/// Tracing target for NATS object store operations.
///
/// Use this target for logging object storage operations, bucket operations, and object-related errors.
pub const TRACING_TARGET_OBJECT: &str = "quizforge_nats::object";

/// Tracing target for job queue operations.
///
/// Use this target for logging stream operations, consumer operations, and queue-related errors.
pub const TRACING_TARGET_QUEUE: &str = "quizforge_nats::queue";

mod client;
mod error;
pub mod object;
pub mod queue;

// Re-export async_nats types needed by consumers
pub use async_nats::jetstream;
pub use client::{NatsClient, NatsConfig, NatsCredentials};
pub use error::{Error, Result};
