//! Generation job types for the quiz pipeline.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of one quiz generation job.
///
/// Carries everything a worker needs to run the pipeline without reading
/// the quiz set first: the record id (also the dedup key), the owning
/// account, and the stored source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationJob {
    /// Quiz set this job generates questions for.
    pub quiz_set_id: Uuid,
    /// Account that requested the generation.
    pub owner_id: Uuid,
    /// Object-store locator of the source document.
    pub source_key: String,
    /// Original filename, used for scratch naming and error context.
    pub source_name: String,
    /// When the job was enqueued.
    pub created_at: Timestamp,
}

impl GenerationJob {
    /// Creates a new generation job.
    pub fn new(
        quiz_set_id: Uuid,
        owner_id: Uuid,
        source_key: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            quiz_set_id,
            owner_id,
            source_key: source_key.into(),
            source_name: source_name.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Returns job age since enqueue.
    pub fn age(&self) -> std::time::Duration {
        let signed_dur = Timestamp::now().duration_since(self.created_at);
        std::time::Duration::from_secs(signed_dur.as_secs().max(0) as u64)
    }
}

/// A unit of work carried by the quiz job queue.
///
/// A tagged enum even though only one kind exists today; new job kinds
/// extend the queue contract without changing the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QuizJob {
    /// Generate questions from an uploaded source document.
    Generate(GenerationJob),
}

impl QuizJob {
    /// Returns the quiz set id this job targets.
    pub fn quiz_set_id(&self) -> Uuid {
        match self {
            Self::Generate(job) => job.quiz_set_id,
        }
    }

    /// Returns the deduplication key for this job.
    ///
    /// One quiz set maps to exactly one in-flight unit of work.
    pub fn dedup_key(&self) -> String {
        self.quiz_set_id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_round_trips_through_json() {
        let job = QuizJob::Generate(GenerationJob::new(
            Uuid::now_v7(),
            Uuid::new_v4(),
            "source-key",
            "lecture-notes.pdf",
        ));

        let json = serde_json::to_string(&job).unwrap();
        let parsed: QuizJob = serde_json::from_str(&json).unwrap();
        assert_eq!(job, parsed);
    }

    #[test]
    fn wire_format_is_tagged() {
        let job = QuizJob::Generate(GenerationJob::new(
            Uuid::now_v7(),
            Uuid::new_v4(),
            "source-key",
            "lecture-notes.pdf",
        ));

        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json.get("kind").and_then(|v| v.as_str()), Some("generate"));
        assert!(json.get("data").is_some());
    }

    #[test]
    fn dedup_key_is_the_quiz_set_id() {
        let quiz_set_id = Uuid::now_v7();
        let job = QuizJob::Generate(GenerationJob::new(
            quiz_set_id,
            Uuid::new_v4(),
            "source-key",
            "lecture-notes.pdf",
        ));

        assert_eq!(job.dedup_key(), quiz_set_id.to_string());
        assert_eq!(job.quiz_set_id(), quiz_set_id);
    }
}
