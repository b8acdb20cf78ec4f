//! Persistence contract for quiz entities.

use std::sync::Arc;

use async_trait::async_trait;
use quizforge_core::QuizQuestion;
use uuid::Uuid;

use crate::{QuizSession, QuizSet, Result};

/// Shared handle to a [`QuizRepository`] implementation.
pub type QuizStore = Arc<dyn QuizRepository>;

/// Atomic create/read/update access to quiz entities.
///
/// Every method is a single atomic operation; callers never compose
/// read-modify-write sequences across calls, so concurrent executors
/// cannot observe a half-applied transition. Reads are scoped to the
/// owning account and return `None` for records owned by anyone else.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persists a freshly created quiz set.
    async fn create_quiz_set(&self, quiz_set: QuizSet) -> Result<()>;

    /// Finds a quiz set by id, scoped to its owner.
    async fn find_quiz_set(&self, id: Uuid, owner_id: Uuid) -> Result<Option<QuizSet>>;

    /// Atomically marks a set `ready`, attaching its questions and
    /// clearing any error from a previous attempt.
    async fn set_ready(&self, id: Uuid, questions: Vec<QuizQuestion>) -> Result<()>;

    /// Atomically marks a set `error`, discarding stale questions.
    async fn set_error(&self, id: Uuid, message: &str) -> Result<()>;

    /// Persists an immutable attempt record.
    async fn create_session(&self, session: QuizSession) -> Result<()>;

    /// Lists the owner's attempts, newest first.
    async fn list_sessions(&self, owner_id: Uuid) -> Result<Vec<QuizSession>>;

    /// Finds one attempt by id, scoped to its owner.
    async fn find_session(&self, id: Uuid, owner_id: Uuid) -> Result<Option<QuizSession>>;
}

#[async_trait]
impl<T: QuizRepository + ?Sized> QuizRepository for Arc<T> {
    async fn create_quiz_set(&self, quiz_set: QuizSet) -> Result<()> {
        (**self).create_quiz_set(quiz_set).await
    }

    async fn find_quiz_set(&self, id: Uuid, owner_id: Uuid) -> Result<Option<QuizSet>> {
        (**self).find_quiz_set(id, owner_id).await
    }

    async fn set_ready(&self, id: Uuid, questions: Vec<QuizQuestion>) -> Result<()> {
        (**self).set_ready(id, questions).await
    }

    async fn set_error(&self, id: Uuid, message: &str) -> Result<()> {
        (**self).set_error(id, message).await
    }

    async fn create_session(&self, session: QuizSession) -> Result<()> {
        (**self).create_session(session).await
    }

    async fn list_sessions(&self, owner_id: Uuid) -> Result<Vec<QuizSession>> {
        (**self).list_sessions(owner_id).await
    }

    async fn find_session(&self, id: Uuid, owner_id: Uuid) -> Result<Option<QuizSession>> {
        (**self).find_session(id, owner_id).await
    }
}
