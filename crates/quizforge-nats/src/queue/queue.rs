//! Generation job queue over a JetStream work-queue stream.

use std::time::Duration;

use async_nats::HeaderMap;
use async_nats::header::NATS_MESSAGE_ID;
use async_nats::jetstream::consumer::{AckPolicy, PullConsumer, pull};
use async_nats::jetstream::{self, AckKind, stream};
use futures::StreamExt;
use tracing::{debug, instrument};

use super::generation_job::QuizJob;
use super::retry::RetryPolicy;
use crate::{Error, Result, TRACING_TARGET_QUEUE};

/// Stream carrying quiz generation jobs.
const STREAM_NAME: &str = "QUIZ_JOBS";

/// Subject generation jobs are published to.
const SUBJECT: &str = "jobs.quiz.generate";

/// Durable consumer shared by the worker pool.
const CONSUMER_NAME: &str = "quiz-generation-worker";

/// Window within which a second publish with the same dedup key is dropped.
const DUPLICATE_WINDOW: Duration = Duration::from_secs(10 * 60);

/// How long abandoned job metadata stays around for inspection.
const MAX_AGE: Duration = Duration::from_secs(7 * 24 * 3600);

/// How long a worker may hold a delivered job before it is redelivered.
const ACK_WAIT: Duration = Duration::from_secs(300);

/// Durable queue for quiz generation jobs.
///
/// Publishing is idempotent per quiz set: the quiz set id travels as the
/// message's dedup key, so re-enqueueing the same record inside the
/// duplicate window creates no second unit of work. Delivery is
/// at-least-once; unacked jobs come back after [`ACK_WAIT`].
#[derive(Clone)]
pub struct GenerationQueue {
    jetstream: jetstream::Context,
    retry_policy: RetryPolicy,
}

impl GenerationQueue {
    /// Creates the queue, ensuring the underlying stream exists.
    #[instrument(skip(jetstream), target = TRACING_TARGET_QUEUE)]
    pub async fn new(jetstream: &jetstream::Context, retry_policy: RetryPolicy) -> Result<Self> {
        let stream_config = stream::Config {
            name: STREAM_NAME.to_string(),
            description: Some("Quiz generation job queue".to_string()),
            subjects: vec![SUBJECT.to_string()],
            retention: stream::RetentionPolicy::WorkQueue,
            duplicate_window: DUPLICATE_WINDOW,
            max_age: MAX_AGE,
            ..Default::default()
        };

        match jetstream.get_stream(STREAM_NAME).await {
            Ok(_) => {
                debug!(
                    target: TRACING_TARGET_QUEUE,
                    stream = %STREAM_NAME,
                    "Using existing job stream"
                );
            }
            Err(_) => {
                debug!(
                    target: TRACING_TARGET_QUEUE,
                    stream = %STREAM_NAME,
                    "Creating job stream"
                );
                jetstream
                    .create_stream(stream_config)
                    .await
                    .map_err(|e| Error::stream_error(STREAM_NAME, e.to_string()))?;
            }
        }

        Ok(Self {
            jetstream: jetstream.clone(),
            retry_policy,
        })
    }

    /// Returns the retry policy the consumer is configured with.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Publishes a job, keyed by the quiz set id for deduplication.
    ///
    /// Fire-and-forget from the submitter's perspective: the call returns
    /// once the stream has accepted the message, never when the job runs.
    #[instrument(skip(self, job), target = TRACING_TARGET_QUEUE)]
    pub async fn publish(&self, job: &QuizJob) -> Result<()> {
        let payload = serde_json::to_vec(job)?;
        let headers = dedup_headers(job);

        self.jetstream
            .publish_with_headers(SUBJECT, headers, payload.into())
            .await
            .map_err(|e| Error::delivery_failed(SUBJECT, e.to_string()))?
            .await
            .map_err(|e| Error::delivery_failed(SUBJECT, e.to_string()))?;

        debug!(
            target: TRACING_TARGET_QUEUE,
            quiz_set_id = %job.quiz_set_id(),
            subject = %SUBJECT,
            "Enqueued generation job"
        );
        Ok(())
    }

    /// Creates the durable pull consumer the worker pool drains.
    #[instrument(skip(self), target = TRACING_TARGET_QUEUE)]
    pub async fn subscribe(&self) -> Result<JobConsumer> {
        let stream = self
            .jetstream
            .get_stream(STREAM_NAME)
            .await
            .map_err(|e| Error::stream_error(STREAM_NAME, e.to_string()))?;

        let consumer = stream
            .create_consumer(consumer_config(&self.retry_policy))
            .await
            .map_err(|e| Error::consumer_error(CONSUMER_NAME, e.to_string()))?;

        debug!(
            target: TRACING_TARGET_QUEUE,
            consumer = %CONSUMER_NAME,
            stream = %STREAM_NAME,
            max_deliver = self.retry_policy.max_attempts,
            "Created worker consumer"
        );

        Ok(JobConsumer { consumer })
    }
}

/// Builds the dedup header map for a job.
fn dedup_headers(job: &QuizJob) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(NATS_MESSAGE_ID, job.dedup_key().as_str());
    headers
}

/// Builds the pull consumer configuration for a retry policy.
///
/// `max_deliver` caps total deliveries at the attempt ceiling; `backoff`
/// carries the exponential redelivery schedule.
fn consumer_config(policy: &RetryPolicy) -> pull::Config {
    pull::Config {
        name: Some(CONSUMER_NAME.to_string()),
        durable_name: Some(CONSUMER_NAME.to_string()),
        description: Some("Quiz generation worker consumer".to_string()),
        ack_policy: AckPolicy::Explicit,
        ack_wait: ACK_WAIT,
        max_deliver: policy.max_attempts as i64,
        backoff: policy.backoff_schedule(),
        ..Default::default()
    }
}

/// A pull consumer handing out typed generation jobs.
pub struct JobConsumer {
    consumer: PullConsumer,
}

impl JobConsumer {
    /// Fetches the next job, waiting up to `max_wait`.
    ///
    /// Returns `Ok(None)` when the wait expires with nothing queued, and
    /// drops (acks) messages whose payload no longer deserializes so a
    /// poison message cannot wedge the queue.
    pub async fn next(&self, max_wait: Duration) -> Result<Option<JobMessage>> {
        let mut batch = self
            .consumer
            .fetch()
            .max_messages(1)
            .expires(max_wait)
            .messages()
            .await
            .map_err(|e| Error::consumer_error(CONSUMER_NAME, e.to_string()))?;

        let Some(message) = batch.next().await else {
            return Ok(None);
        };
        let message = message.map_err(|e| Error::consumer_error(CONSUMER_NAME, e.to_string()))?;

        match serde_json::from_slice::<QuizJob>(&message.payload) {
            Ok(job) => Ok(Some(JobMessage { message, job })),
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_QUEUE,
                    error = %err,
                    "Dropping undecodable job message"
                );
                message
                    .ack()
                    .await
                    .map_err(|e| Error::operation("job_ack", e.to_string()))?;
                Ok(None)
            }
        }
    }
}

/// A delivered job plus the queue message it arrived on.
pub struct JobMessage {
    message: jetstream::Message,
    job: QuizJob,
}

impl JobMessage {
    /// Returns the decoded job.
    pub fn job(&self) -> &QuizJob {
        &self.job
    }

    /// Returns the 1-based delivery count of this message.
    pub fn deliveries(&self) -> u32 {
        self.message
            .info()
            .map(|info| info.delivered.max(1) as u32)
            .unwrap_or(1)
    }

    /// Acknowledges the job as completed; it will not be redelivered.
    pub async fn ack(&self) -> Result<()> {
        self.message
            .ack()
            .await
            .map_err(|e| Error::operation("job_ack", e.to_string()))
    }

    /// Reports failure, scheduling redelivery after `delay`.
    ///
    /// Once the consumer's delivery ceiling is reached the stream stops
    /// redelivering regardless of the requested delay.
    pub async fn retry_after(&self, delay: Duration) -> Result<()> {
        self.message
            .ack_with(AckKind::Nak(Some(delay)))
            .await
            .map_err(|e| Error::operation("job_nak", e.to_string()))
    }
}
