//! Quiz generation pipeline worker.
//!
//! Consumes generation jobs from the queue and runs each one through the
//! fetch, stage, generate, validate, and persist stages, with cleanup of
//! local and remote resources in every outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use quizforge_core::{GenerationProvider, RemoteFile, SourceFetcher, validate_questions};
use quizforge_data::{QuizRepository, QuizStore};
use quizforge_gemini::GeminiClient;
use quizforge_nats::object::{SourceKey, SourceStore};
use quizforge_nats::queue::{GenerationJob, GenerationQueue, JobMessage, QuizJob, RetryPolicy};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::throttle::StartThrottle;
use crate::{Error, Result};

/// Tracing target for generation worker operations.
const TRACING_TARGET: &str = "quizforge_server::worker::generation";

/// MIME type every staged source document is uploaded with.
const PDF_MIME_TYPE: &str = "application/pdf";

/// Worker the server binary runs in production.
pub type ServiceWorker = GenerationWorker<QuizStore, SourceStore, GeminiClient>;

/// Tuning for the worker pool.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum jobs processed concurrently.
    pub max_concurrent_jobs: usize,
    /// Maximum job starts within one rolling second.
    pub max_starts_per_second: usize,
    /// How long one queue fetch waits before re-checking for shutdown.
    pub fetch_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 5,
            max_starts_per_second: 5,
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

/// The per-job pipeline, seamed on its external collaborators.
///
/// Stages run strictly in order and no stage is retried on its own; a
/// failure fails the whole attempt and the queue redelivers the job.
pub struct GenerationPipeline<R, S, G> {
    repository: R,
    sources: S,
    generator: G,
    scratch_dir: PathBuf,
}

impl<R, S, G> GenerationPipeline<R, S, G>
where
    R: QuizRepository,
    S: SourceFetcher,
    G: GenerationProvider,
{
    /// Creates a pipeline writing scratch files to the OS temp directory.
    pub fn new(repository: R, sources: S, generator: G) -> Self {
        Self {
            repository,
            sources,
            generator,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Overrides the scratch directory.
    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }

    /// Runs one job to a terminal outcome.
    ///
    /// On failure the quiz set is best-effort moved to `error`; if that
    /// write fails too, the record keeps its prior status and the queue's
    /// redelivery gets another chance to reconcile it.
    pub async fn execute(&self, job: &GenerationJob) -> Result<usize> {
        let mut scratch: Option<PathBuf> = None;
        let mut remote: Option<RemoteFile> = None;

        let outcome = self.run_stages(job, &mut scratch, &mut remote).await;

        // Cleanup always runs, success or failure, and never fails the job.
        self.cleanup(scratch.as_deref(), remote.as_ref()).await;

        if let Err(err) = &outcome {
            if let Err(update_err) = self
                .repository
                .set_error(job.quiz_set_id, err.message())
                .await
            {
                tracing::warn!(
                    target: TRACING_TARGET,
                    quiz_set_id = %job.quiz_set_id,
                    error = %update_err,
                    "Failed to record job failure on quiz set"
                );
            }
        }

        outcome
    }

    /// The fetch → stage → generate → validate → persist sequence.
    async fn run_stages(
        &self,
        job: &GenerationJob,
        scratch: &mut Option<PathBuf>,
        remote: &mut Option<RemoteFile>,
    ) -> Result<usize> {
        // Fetch: the locator must have been minted for the job's owner
        // before any bytes move.
        let source_key: SourceKey = job.source_key.parse().map_err(|err: quizforge_nats::Error| {
            Error::internal("pipeline", format!("invalid source locator: {err}"))
        })?;
        if !source_key.is_owned_by(job.owner_id) {
            return Err(Error::internal(
                "pipeline",
                "source document is not owned by the requesting account",
            ));
        }

        // Materialize the source document to a scratch file.
        let data = self.sources.fetch(&job.source_key).await.map_err(|err| {
            external("source store", format!("failed to fetch '{}'", job.source_name), err)
        })?;

        let path = self.scratch_path(&job.source_name);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|err| Error::file_system("failed to write scratch file").with_source(err))?;
        *scratch = Some(path.clone());
        drop(data);

        tracing::debug!(
            target: TRACING_TARGET,
            quiz_set_id = %job.quiz_set_id,
            path = %path.display(),
            "Materialized source document"
        );

        // Stage: hand the document to the generation backend.
        let document = tokio::fs::read(&path)
            .await
            .map_err(|err| Error::file_system("failed to read scratch file").with_source(err))?;
        let file = self
            .generator
            .upload_document(document, &job.source_name, PDF_MIME_TYPE)
            .await
            .map_err(|err| external("generation", "failed to stage document", err))?;
        *remote = Some(file.clone());

        // Generate.
        let questions = self
            .generator
            .generate_questions(&file)
            .await
            .map_err(|err| external("generation", "generation failed", err))?;

        // Validate: the whole sequence, empty output included.
        validate_questions(&questions)
            .map_err(|err| external("generation", "invalid generation output", err))?;

        // Persist: the single durable commit point.
        self.repository
            .set_ready(job.quiz_set_id, questions.clone())
            .await
            .map_err(|err| {
                Error::internal("repository", "failed to persist questions").with_source(err)
            })?;

        Ok(questions.len())
    }

    /// Deletes the scratch file and releases the staged remote document.
    ///
    /// Errors are logged and swallowed; a failed cleanup never reopens
    /// the job or blocks the record's terminal status.
    async fn cleanup(&self, scratch: Option<&Path>, remote: Option<&RemoteFile>) {
        if let Some(path) = scratch {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        path = %path.display(),
                        "Deleted scratch file"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        path = %path.display(),
                        error = %err,
                        "Failed to delete scratch file"
                    );
                }
            }
        }

        if let Some(file) = remote {
            match self.generator.delete_document(file).await {
                Ok(()) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        file = %file.name,
                        "Released staged document"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        file = %file.name,
                        error = %err,
                        "Failed to release staged document"
                    );
                }
            }
        }
    }

    /// Collision-resistant scratch path keeping the original basename.
    fn scratch_path(&self, source_name: &str) -> PathBuf {
        let base = Path::new(source_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.pdf");
        self.scratch_dir.join(format!("{}-{}", Uuid::new_v4(), base))
    }
}

/// Maps a collaborator error into a service error, keeping the
/// collaborator's own message as the human-readable cause.
fn external(service: &'static str, context: impl Into<String>, err: quizforge_core::Error) -> Error {
    let detail = err.message.clone().unwrap_or_else(|| err.to_string());
    Error::external(service, format!("{}: {}", context.into(), detail)).with_source(err)
}

/// Worker pool draining the generation job queue.
///
/// Runs at most [`WorkerConfig::max_concurrent_jobs`] pipelines at once
/// and starts no more than [`WorkerConfig::max_starts_per_second`] jobs
/// per rolling second; each job runs its stages sequentially inside one
/// executor.
pub struct GenerationWorker<R, S, G> {
    queue: GenerationQueue,
    pipeline: Arc<GenerationPipeline<R, S, G>>,
    config: WorkerConfig,
}

impl<R, S, G> GenerationWorker<R, S, G>
where
    R: QuizRepository + 'static,
    S: SourceFetcher + 'static,
    G: GenerationProvider + 'static,
{
    /// Creates a new generation worker.
    pub fn new(
        queue: GenerationQueue,
        repository: R,
        sources: S,
        generator: G,
        config: WorkerConfig,
    ) -> Self {
        Self {
            queue,
            pipeline: Arc::new(GenerationPipeline::new(repository, sources, generator)),
            config,
        }
    }

    /// Runs the worker until cancelled, then drains in-flight jobs.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        tracing::info!(
            target: TRACING_TARGET,
            max_concurrent_jobs = self.config.max_concurrent_jobs,
            max_starts_per_second = self.config.max_starts_per_second,
            "Starting generation worker"
        );

        let result = self.run_inner(cancel).await;

        match &result {
            Ok(()) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    "Generation worker stopped"
                );
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %err,
                    "Generation worker failed"
                );
            }
        }

        result
    }

    /// Internal consume loop.
    async fn run_inner(&self, cancel: CancellationToken) -> Result<()> {
        let consumer = self.queue.subscribe().await?;
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_jobs));
        let throttle = StartThrottle::new(self.config.max_starts_per_second, Duration::from_secs(1));
        let retry_policy = self.queue.retry_policy().clone();

        loop {
            // Hold capacity before pulling, so an accepted delivery always
            // has an executor to run on.
            let permit = tokio::select! {
                _ = cancel.cancelled() => break,
                permit = permits.clone().acquire_owned() => {
                    let Ok(permit) = permit else { break };
                    permit
                }
            };

            let message = tokio::select! {
                _ = cancel.cancelled() => break,
                result = consumer.next(self.config.fetch_timeout) => match result {
                    Ok(Some(message)) => message,
                    Ok(None) => continue,
                    Err(err) => {
                        tracing::error!(
                            target: TRACING_TARGET,
                            error = %err,
                            "Error receiving job from queue"
                        );
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                }
            };

            throttle.acquire().await;

            let pipeline = self.pipeline.clone();
            let policy = retry_policy.clone();
            tokio::spawn(async move {
                let _permit = permit;
                handle_message(pipeline, policy, message).await;
            });
        }

        // Drain in-flight jobs before reporting shutdown.
        let max_permits = self.config.max_concurrent_jobs as u32;
        let _drained = permits.acquire_many(max_permits).await;

        Ok(())
    }
}

/// Processes one delivered job and reports the outcome to the queue.
async fn handle_message<R, S, G>(
    pipeline: Arc<GenerationPipeline<R, S, G>>,
    policy: RetryPolicy,
    message: JobMessage,
) where
    R: QuizRepository,
    S: SourceFetcher,
    G: GenerationProvider,
{
    let job = match message.job() {
        QuizJob::Generate(job) => job.clone(),
    };
    let attempt = message.deliveries();

    tracing::debug!(
        target: TRACING_TARGET,
        quiz_set_id = %job.quiz_set_id,
        attempt = attempt,
        "Processing generation job"
    );

    match pipeline.execute(&job).await {
        Ok(question_count) => {
            tracing::info!(
                target: TRACING_TARGET,
                quiz_set_id = %job.quiz_set_id,
                question_count = question_count,
                "Generation job succeeded"
            );
            if let Err(err) = message.ack().await {
                tracing::error!(
                    target: TRACING_TARGET,
                    quiz_set_id = %job.quiz_set_id,
                    error = %err,
                    "Failed to ack completed job"
                );
            }
        }
        Err(err) => {
            let delay = policy.delay_after_attempt(attempt);
            tracing::error!(
                target: TRACING_TARGET,
                quiz_set_id = %job.quiz_set_id,
                attempt = attempt,
                max_attempts = policy.max_attempts,
                retry_delay_secs = delay.as_secs(),
                error = %err,
                "Generation job failed"
            );
            if let Err(nak_err) = message.retry_after(delay).await {
                tracing::error!(
                    target: TRACING_TARGET,
                    quiz_set_id = %job.quiz_set_id,
                    error = %nak_err,
                    "Failed to nack failed job"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use quizforge_core::QuizQuestion;
    use quizforge_data::{MemoryRepository, QuizSet, QuizStatus};

    use super::*;

    /// Generation backend fake recording every staging and release.
    #[derive(Clone, Default)]
    struct RecordingGenerator {
        fail_generation: bool,
        question_count: usize,
        staged: Arc<Mutex<Vec<String>>>,
        released: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingGenerator {
        fn succeeding(question_count: usize) -> Self {
            Self {
                question_count,
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail_generation: true,
                question_count: 10,
                ..Self::default()
            }
        }

        fn empty_output() -> Self {
            Self::succeeding(0)
        }
    }

    #[async_trait]
    impl GenerationProvider for RecordingGenerator {
        async fn upload_document(
            &self,
            _data: Vec<u8>,
            display_name: &str,
            mime_type: &str,
        ) -> quizforge_core::Result<RemoteFile> {
            self.staged.lock().unwrap().push(display_name.to_string());
            Ok(RemoteFile {
                name: "files/staged-doc".to_string(),
                uri: "https://backend.test/v1beta/files/staged-doc".to_string(),
                mime_type: mime_type.to_string(),
            })
        }

        async fn generate_questions(
            &self,
            _file: &RemoteFile,
        ) -> quizforge_core::Result<Vec<QuizQuestion>> {
            if self.fail_generation {
                return Err(quizforge_core::Error::external_error()
                    .with_message("generation blocked by safety filter: SAFETY"));
            }
            Ok((0..self.question_count)
                .map(|i| QuizQuestion {
                    question_text: format!("Question {i}?"),
                    options: vec![
                        "A".to_string(),
                        "B".to_string(),
                        "C".to_string(),
                        "D".to_string(),
                    ],
                    correct_answer_index: i % 4,
                })
                .collect())
        }

        async fn delete_document(&self, file: &RemoteFile) -> quizforge_core::Result<()> {
            self.released.lock().unwrap().push(file.name.clone());
            Ok(())
        }
    }

    /// Source fake serving fixed bytes.
    #[derive(Clone)]
    struct StaticSource {
        data: Vec<u8>,
    }

    #[async_trait]
    impl SourceFetcher for StaticSource {
        async fn fetch(&self, _locator: &str) -> quizforge_core::Result<Vec<u8>> {
            Ok(self.data.clone())
        }
    }

    /// Source fake that always fails, as if the object were missing.
    #[derive(Clone)]
    struct MissingSource;

    #[async_trait]
    impl SourceFetcher for MissingSource {
        async fn fetch(&self, locator: &str) -> quizforge_core::Result<Vec<u8>> {
            Err(quizforge_core::Error::not_found()
                .with_message(format!("source document '{locator}' not found")))
        }
    }

    async fn quiz_set_for(repository: &MemoryRepository) -> (GenerationJob, Uuid) {
        let owner_id = Uuid::new_v4();
        let source_key = SourceKey::for_upload(owner_id).to_string();
        let quiz_set = QuizSet::new(owner_id, source_key.clone(), "lecture-notes.pdf");
        let id = quiz_set.id;
        repository.create_quiz_set(quiz_set).await.unwrap();
        (
            GenerationJob::new(id, owner_id, source_key, "lecture-notes.pdf"),
            owner_id,
        )
    }

    fn scratch_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    #[tokio::test]
    async fn successful_run_persists_ready_quiz_and_cleans_up() {
        let repository = MemoryRepository::new();
        let (job, owner_id) = quiz_set_for(&repository).await;
        let generator = RecordingGenerator::succeeding(10);
        let scratch = tempfile::tempdir().unwrap();

        let pipeline = GenerationPipeline::new(
            repository.clone(),
            StaticSource {
                data: b"%PDF-1.4 one page".to_vec(),
            },
            generator.clone(),
        )
        .with_scratch_dir(scratch.path());

        let count = pipeline.execute(&job).await.unwrap();
        assert_eq!(count, 10);

        let quiz_set = repository
            .find_quiz_set(job.quiz_set_id, owner_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quiz_set.status, QuizStatus::Ready);
        assert_eq!(quiz_set.question_count(), 10);
        assert!(quiz_set.error_message.is_none());

        // Scratch file deleted and remote handle released.
        assert!(scratch_files(scratch.path()).is_empty());
        assert_eq!(
            generator.released.lock().unwrap().as_slice(),
            ["files/staged-doc"]
        );
    }

    #[tokio::test]
    async fn generation_failure_records_error_and_still_cleans_up() {
        let repository = MemoryRepository::new();
        let (job, owner_id) = quiz_set_for(&repository).await;
        let generator = RecordingGenerator::failing();
        let scratch = tempfile::tempdir().unwrap();

        let pipeline = GenerationPipeline::new(
            repository.clone(),
            StaticSource {
                data: b"%PDF-1.4".to_vec(),
            },
            generator.clone(),
        )
        .with_scratch_dir(scratch.path());

        let err = pipeline.execute(&job).await.unwrap_err();
        assert!(err.message().contains("blocked"));

        let quiz_set = repository
            .find_quiz_set(job.quiz_set_id, owner_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quiz_set.status, QuizStatus::Error);
        assert!(quiz_set.questions.is_none());
        assert!(
            quiz_set
                .error_message
                .as_deref()
                .unwrap()
                .contains("blocked")
        );

        // Cleanup ran even though the job failed.
        assert!(scratch_files(scratch.path()).is_empty());
        assert_eq!(
            generator.released.lock().unwrap().as_slice(),
            ["files/staged-doc"]
        );
    }

    #[tokio::test]
    async fn fetch_failure_aborts_before_staging() {
        let repository = MemoryRepository::new();
        let (job, owner_id) = quiz_set_for(&repository).await;
        let generator = RecordingGenerator::succeeding(10);

        let pipeline =
            GenerationPipeline::new(repository.clone(), MissingSource, generator.clone());

        pipeline.execute(&job).await.unwrap_err();

        // Nothing was staged remotely, nothing to release.
        assert!(generator.staged.lock().unwrap().is_empty());
        assert!(generator.released.lock().unwrap().is_empty());

        let quiz_set = repository
            .find_quiz_set(job.quiz_set_id, owner_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quiz_set.status, QuizStatus::Error);
    }

    #[tokio::test]
    async fn foreign_source_locator_is_rejected_before_any_fetch() {
        let repository = MemoryRepository::new();
        let (mut job, owner_id) = quiz_set_for(&repository).await;
        // Swap in a locator minted for a different account.
        job.source_key = SourceKey::for_upload(Uuid::new_v4()).to_string();
        let generator = RecordingGenerator::succeeding(10);

        let pipeline = GenerationPipeline::new(
            repository.clone(),
            StaticSource {
                data: b"%PDF-1.4".to_vec(),
            },
            generator.clone(),
        );

        let err = pipeline.execute(&job).await.unwrap_err();
        assert!(err.message().contains("not owned"));

        // The pipeline stopped before touching the source or the backend.
        assert!(generator.staged.lock().unwrap().is_empty());

        let quiz_set = repository
            .find_quiz_set(job.quiz_set_id, owner_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quiz_set.status, QuizStatus::Error);
    }

    #[tokio::test]
    async fn empty_generation_output_fails_the_job() {
        let repository = MemoryRepository::new();
        let (job, owner_id) = quiz_set_for(&repository).await;
        let scratch = tempfile::tempdir().unwrap();

        let pipeline = GenerationPipeline::new(
            repository.clone(),
            StaticSource {
                data: b"%PDF-1.4".to_vec(),
            },
            RecordingGenerator::empty_output(),
        )
        .with_scratch_dir(scratch.path());

        let err = pipeline.execute(&job).await.unwrap_err();
        assert!(err.message().contains("no questions"));

        let quiz_set = repository
            .find_quiz_set(job.quiz_set_id, owner_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quiz_set.status, QuizStatus::Error);
    }

    #[tokio::test]
    async fn failed_error_write_leaves_outcome_to_redelivery() {
        // No quiz set exists, so even the error write fails; execute still
        // reports the failure without panicking.
        let repository = MemoryRepository::new();
        let owner_id = Uuid::new_v4();
        let job = GenerationJob::new(
            Uuid::now_v7(),
            owner_id,
            SourceKey::for_upload(owner_id).to_string(),
            "lecture-notes.pdf",
        );
        let scratch = tempfile::tempdir().unwrap();

        let pipeline = GenerationPipeline::new(
            repository.clone(),
            StaticSource {
                data: b"%PDF-1.4".to_vec(),
            },
            RecordingGenerator::failing(),
        )
        .with_scratch_dir(scratch.path());

        assert!(pipeline.execute(&job).await.is_err());
        assert!(scratch_files(scratch.path()).is_empty());
    }
}
