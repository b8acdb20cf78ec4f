//! Application state and dependency injection.

use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use quizforge_data::{MemoryRepository, QuizStore};
use quizforge_gemini::GeminiClient;
use quizforge_nats::NatsClient;
use quizforge_nats::object::SourceStore;
use quizforge_nats::queue::{GenerationQueue, RetryPolicy};

use crate::service::ServiceConfig;
use crate::worker::{GenerationWorker, ServiceWorker, WorkerConfig};
use crate::{Error, Result};

/// Keys used to verify access tokens.
#[derive(Clone)]
pub struct AuthKeys {
    decoding: Arc<DecodingKey>,
}

impl AuthKeys {
    /// Creates verification keys from an HMAC secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    /// Returns the decoding key.
    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Application state.
///
/// Every service is constructed once at startup and passed explicitly
/// into the router and the worker; nothing hides in module-level globals.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    repository: QuizStore,
    source_store: SourceStore,
    generation_queue: GenerationQueue,
    generation_client: GeminiClient,
    nats_client: NatsClient,
    auth_keys: AuthKeys,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to all external services and prepares the stream and
    /// bucket resources the server depends on.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let nats_client = config.connect_nats().await?;
        let source_store = SourceStore::new(nats_client.jetstream()).await?;
        let generation_queue =
            GenerationQueue::new(nats_client.jetstream(), RetryPolicy::default()).await?;
        let generation_client = GeminiClient::new(config.gemini_config())
            .map_err(|err| Error::external("gemini", err.to_string()).with_source(err))?;

        Ok(Self {
            repository: Arc::new(MemoryRepository::new()),
            source_store,
            generation_queue,
            generation_client,
            nats_client,
            auth_keys: config.auth_keys(),
        })
    }

    /// Assembles state from already-constructed parts.
    pub fn from_parts(
        repository: QuizStore,
        source_store: SourceStore,
        generation_queue: GenerationQueue,
        generation_client: GeminiClient,
        nats_client: NatsClient,
        auth_keys: AuthKeys,
    ) -> Self {
        Self {
            repository,
            source_store,
            generation_queue,
            generation_client,
            nats_client,
            auth_keys,
        }
    }

    /// Returns the NATS client, e.g. for shutdown handling.
    pub fn nats_client(&self) -> &NatsClient {
        &self.nats_client
    }

    /// Builds the generation worker over this state's services.
    pub fn generation_worker(&self, config: WorkerConfig) -> ServiceWorker {
        GenerationWorker::new(
            self.generation_queue.clone(),
            self.repository.clone(),
            self.source_store.clone(),
            self.generation_client.clone(),
            config,
        )
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+ $(,)?) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(repository: QuizStore);
impl_di!(source_store: SourceStore);
impl_di!(generation_queue: GenerationQueue);
impl_di!(generation_client: GeminiClient);
impl_di!(auth_keys: AuthKeys);
