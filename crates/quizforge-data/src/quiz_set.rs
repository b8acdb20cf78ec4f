//! Quiz set entity and its generation status state machine.

use jiff::Timestamp;
use quizforge_core::QuizQuestion;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generation status of a quiz set.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuizStatus {
    /// Generation job is queued or running.
    #[default]
    Processing,
    /// Questions were generated and persisted.
    Ready,
    /// Generation failed terminally for the most recent attempt.
    Error,
}

impl QuizStatus {
    /// Checks if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }
}

/// One generation request and its durable outcome.
///
/// Created as `processing` by the submission path. Only the pipeline worker
/// moves a set to a terminal status, and `questions`/`error_message` are
/// mutually exclusive at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSet {
    /// Unique identifier, also the generation job's dedup key.
    pub id: Uuid,
    /// Account that uploaded the source document.
    pub owner_id: Uuid,
    /// Opaque object-store locator of the source document.
    pub source_key: String,
    /// Original filename, kept for display and error context.
    pub source_name: String,
    /// Current generation status.
    pub status: QuizStatus,
    /// Failure cause, present iff `status` is [`QuizStatus::Error`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Generated questions, present iff `status` is [`QuizStatus::Ready`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuizQuestion>>,
    /// When the set was created.
    pub created_at: Timestamp,
}

impl QuizSet {
    /// Creates a new quiz set in the `processing` state.
    pub fn new(
        owner_id: Uuid,
        source_key: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner_id,
            source_key: source_key.into(),
            source_name: source_name.into(),
            status: QuizStatus::Processing,
            error_message: None,
            questions: None,
            created_at: Timestamp::now(),
        }
    }

    /// Moves the set to `ready`, attaching the generated questions and
    /// clearing any error from a previous attempt.
    pub fn mark_ready(&mut self, questions: Vec<QuizQuestion>) {
        self.questions = Some(questions);
        self.error_message = None;
        self.status = QuizStatus::Ready;
    }

    /// Moves the set to `error`, discarding any stale questions.
    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.questions = None;
        self.error_message = Some(message.into());
        self.status = QuizStatus::Error;
    }

    /// Checks if the set has finished generation successfully.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.status == QuizStatus::Ready
    }

    /// Returns the number of generated questions, zero while not ready.
    pub fn question_count(&self) -> usize {
        self.questions.as_ref().map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use quizforge_core::QuizQuestion;

    use super::*;

    fn questions() -> Vec<QuizQuestion> {
        vec![QuizQuestion {
            question_text: "Which planet is closest to the sun?".to_string(),
            options: vec![
                "Venus".to_string(),
                "Mercury".to_string(),
                "Mars".to_string(),
                "Earth".to_string(),
            ],
            correct_answer_index: 1,
        }]
    }

    #[test]
    fn new_quiz_set_is_processing() {
        let set = QuizSet::new(Uuid::new_v4(), "key", "notes.pdf");
        assert_eq!(set.status, QuizStatus::Processing);
        assert!(set.questions.is_none());
        assert!(set.error_message.is_none());
        assert_eq!(set.question_count(), 0);
    }

    #[test]
    fn mark_ready_clears_previous_error() {
        let mut set = QuizSet::new(Uuid::new_v4(), "key", "notes.pdf");
        set.mark_error("backend unavailable");
        set.mark_ready(questions());

        assert_eq!(set.status, QuizStatus::Ready);
        assert!(set.error_message.is_none());
        assert_eq!(set.question_count(), 1);
    }

    #[test]
    fn mark_error_discards_stale_questions() {
        let mut set = QuizSet::new(Uuid::new_v4(), "key", "notes.pdf");
        set.mark_ready(questions());
        set.mark_error("regeneration failed");

        assert_eq!(set.status, QuizStatus::Error);
        assert!(set.questions.is_none());
        assert_eq!(set.error_message.as_deref(), Some("regeneration failed"));
    }

    #[test]
    fn terminal_states_are_exclusive() {
        // For every terminal transition exactly one of questions/error is set.
        let mut set = QuizSet::new(Uuid::new_v4(), "key", "notes.pdf");

        set.mark_ready(questions());
        assert!(set.questions.is_some() && set.error_message.is_none());
        assert!(set.status.is_terminal());

        set.mark_error("failed");
        assert!(set.questions.is_none() && set.error_message.is_some());
        assert!(set.status.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&QuizStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        assert_eq!(QuizStatus::Ready.to_string(), "ready");
    }
}
