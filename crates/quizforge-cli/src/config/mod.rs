//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig    # Host, port, shutdown
//! ├── service: ServiceArgs    # NATS, Gemini, auth secret
//! └── worker: WorkerArgs      # Pool size, start throttle
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

mod server;
mod service;

use clap::Parser;
pub use server::ServerConfig;
pub use service::{ServiceArgs, WorkerArgs};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "quizforge")]
#[command(about = "Quizforge PDF quiz generation server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// External service configuration (queue, generation backend, auth).
    #[clap(flatten)]
    pub service: ServiceArgs,

    /// Generation worker pool configuration.
    #[clap(flatten)]
    pub worker: WorkerArgs,
}

impl Cli {
    /// Loads environment variables from a .env file and parses arguments.
    ///
    /// The .env file is loaded first so clap's `env` fallbacks can pick
    /// up values from it.
    pub fn init() -> Self {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
        Self::parse()
    }

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
