//! Error types for entity and repository operations.

use uuid::Uuid;

/// Result type for all entity and repository operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for entity and repository operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Quiz set does not exist (or is not visible to the caller).
    #[error("quiz set '{id}' not found")]
    QuizSetNotFound { id: Uuid },

    /// Quiz session does not exist (or is not visible to the caller).
    #[error("quiz session '{id}' not found")]
    SessionNotFound { id: Uuid },

    /// Submitted answer sequence does not match the stored question count.
    #[error("expected {expected} answers, got {actual}")]
    AnswerCountMismatch { expected: usize, actual: usize },

    /// Question sequence failed validation.
    #[error("invalid questions: {0}")]
    InvalidQuestions(#[from] quizforge_core::Error),

    /// Backing store failed.
    #[error("storage error: {reason}")]
    Storage { reason: String },
}

impl Error {
    /// Creates a quiz set not found error.
    pub fn quiz_set_not_found(id: Uuid) -> Self {
        Self::QuizSetNotFound { id }
    }

    /// Creates a session not found error.
    pub fn session_not_found(id: Uuid) -> Self {
        Self::SessionNotFound { id }
    }

    /// Creates a storage error.
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage {
            reason: reason.into(),
        }
    }
}
