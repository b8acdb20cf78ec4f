//! Quiz session entity, the immutable record of one graded attempt.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One graded attempt against a quiz set.
///
/// Created atomically after grading and never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    /// Unique session identifier.
    pub id: Uuid,
    /// Account that took the quiz.
    pub owner_id: Uuid,
    /// Quiz set the attempt was graded against.
    pub quiz_set_id: Uuid,
    /// The raw answer sequence as submitted, one index per question.
    pub user_answers: Vec<usize>,
    /// Number of correct answers.
    pub score: usize,
    /// Question count of the quiz set at grading time.
    pub total_questions: usize,
    /// When the attempt was graded.
    pub created_at: Timestamp,
}

impl QuizSession {
    /// Creates a new graded attempt record.
    pub fn new(
        owner_id: Uuid,
        quiz_set_id: Uuid,
        user_answers: Vec<usize>,
        score: usize,
        total_questions: usize,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner_id,
            quiz_set_id,
            user_answers,
            score,
            total_questions,
            created_at: Timestamp::now(),
        }
    }
}
