//! Durable work queue carrying quiz generation jobs to workers.

mod generation_job;
mod queue;
mod retry;

pub use generation_job::{GenerationJob, QuizJob};
pub use queue::{GenerationQueue, JobConsumer, JobMessage};
pub use retry::RetryPolicy;
