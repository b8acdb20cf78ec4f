//! Background workers.

mod generation;
mod throttle;

pub use generation::{GenerationPipeline, GenerationWorker, ServiceWorker, WorkerConfig};
