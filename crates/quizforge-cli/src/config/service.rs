//! External service and worker configuration.

use clap::Args;
use quizforge_server::service::ServiceConfig;
use quizforge_server::worker::WorkerConfig;

/// External service connection configuration.
///
/// # Environment Variables
///
/// - `NATS_URL` - NATS server URL (default: nats://127.0.0.1:4222)
/// - `GEMINI_API_KEY` - Gemini API key (required)
/// - `GEMINI_MODEL` - Gemini model override (optional)
/// - `AUTH_SECRET` - HMAC secret access tokens are verified against (required)
#[derive(Debug, Clone, Args)]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceArgs {
    /// NATS server URL.
    #[arg(long, env = "NATS_URL", default_value = "nats://127.0.0.1:4222")]
    pub nats_url: String,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Gemini model override.
    #[arg(long, env = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// HMAC secret access tokens are verified against.
    #[arg(long, env = "AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: String,
}

impl ServiceArgs {
    /// Builds the server's service configuration.
    pub fn to_service_config(&self) -> ServiceConfig {
        let config = ServiceConfig::new(
            self.nats_url.clone(),
            self.gemini_api_key.clone(),
            self.auth_secret.clone(),
        );
        match &self.gemini_model {
            Some(model) => config.with_gemini_model(model.clone()),
            None => config,
        }
    }
}

/// Generation worker pool configuration.
///
/// # Environment Variables
///
/// - `WORKER_CONCURRENCY` - Maximum concurrent jobs (default: 5)
/// - `WORKER_STARTS_PER_SECOND` - Maximum job starts per second (default: 5)
#[derive(Debug, Clone, Args)]
#[must_use = "config does nothing unless you use it"]
pub struct WorkerArgs {
    /// Maximum jobs processed concurrently.
    #[arg(long, env = "WORKER_CONCURRENCY", default_value_t = 5)]
    pub worker_concurrency: usize,

    /// Maximum job starts within one rolling second.
    #[arg(long, env = "WORKER_STARTS_PER_SECOND", default_value_t = 5)]
    pub worker_starts_per_second: usize,
}

impl WorkerArgs {
    /// Builds the worker pool configuration.
    pub fn to_worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            max_concurrent_jobs: self.worker_concurrency.max(1),
            max_starts_per_second: self.worker_starts_per_second.max(1),
            ..WorkerConfig::default()
        }
    }
}
