//! In-process repository backed by a shared map.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use quizforge_core::QuizQuestion;
use uuid::Uuid;

use crate::repository::QuizRepository;
use crate::{Error, QuizSession, QuizSet, Result};

#[derive(Debug, Default)]
struct Inner {
    quiz_sets: HashMap<Uuid, QuizSet>,
    sessions: HashMap<Uuid, QuizSession>,
}

/// Process-scoped [`QuizRepository`] over a shared map.
///
/// Each method takes the lock once, so every mutation is a single atomic
/// section with last-writer-wins semantics on status transitions.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| Error::storage("repository lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| Error::storage("repository lock poisoned"))
    }
}

#[async_trait]
impl QuizRepository for MemoryRepository {
    async fn create_quiz_set(&self, quiz_set: QuizSet) -> Result<()> {
        let mut inner = self.write()?;
        inner.quiz_sets.insert(quiz_set.id, quiz_set);
        Ok(())
    }

    async fn find_quiz_set(&self, id: Uuid, owner_id: Uuid) -> Result<Option<QuizSet>> {
        let inner = self.read()?;
        Ok(inner
            .quiz_sets
            .get(&id)
            .filter(|set| set.owner_id == owner_id)
            .cloned())
    }

    async fn set_ready(&self, id: Uuid, questions: Vec<QuizQuestion>) -> Result<()> {
        let mut inner = self.write()?;
        let quiz_set = inner
            .quiz_sets
            .get_mut(&id)
            .ok_or_else(|| Error::quiz_set_not_found(id))?;
        quiz_set.mark_ready(questions);
        Ok(())
    }

    async fn set_error(&self, id: Uuid, message: &str) -> Result<()> {
        let mut inner = self.write()?;
        let quiz_set = inner
            .quiz_sets
            .get_mut(&id)
            .ok_or_else(|| Error::quiz_set_not_found(id))?;
        quiz_set.mark_error(message);
        Ok(())
    }

    async fn create_session(&self, session: QuizSession) -> Result<()> {
        let mut inner = self.write()?;
        inner.sessions.insert(session.id, session);
        Ok(())
    }

    async fn list_sessions(&self, owner_id: Uuid) -> Result<Vec<QuizSession>> {
        let inner = self.read()?;
        let mut sessions: Vec<QuizSession> = inner
            .sessions
            .values()
            .filter(|session| session.owner_id == owner_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn find_session(&self, id: Uuid, owner_id: Uuid) -> Result<Option<QuizSession>> {
        let inner = self.read()?;
        Ok(inner
            .sessions
            .get(&id)
            .filter(|session| session.owner_id == owner_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<QuizQuestion> {
        vec![QuizQuestion {
            question_text: "What does HTTP stand for?".to_string(),
            options: vec![
                "HyperText Transfer Protocol".to_string(),
                "High Throughput Transport".to_string(),
                "Host Transfer Text Protocol".to_string(),
                "Hyperlink Tree Protocol".to_string(),
            ],
            correct_answer_index: 0,
        }]
    }

    #[tokio::test]
    async fn find_is_scoped_to_owner() {
        let repository = MemoryRepository::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let quiz_set = QuizSet::new(owner, "key", "notes.pdf");
        let id = quiz_set.id;
        repository.create_quiz_set(quiz_set).await.unwrap();

        assert!(repository.find_quiz_set(id, owner).await.unwrap().is_some());
        // Another account observes "not found", not "forbidden".
        assert!(
            repository
                .find_quiz_set(id, stranger)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn set_ready_then_error_keeps_states_exclusive() {
        let repository = MemoryRepository::new();
        let owner = Uuid::new_v4();
        let quiz_set = QuizSet::new(owner, "key", "notes.pdf");
        let id = quiz_set.id;
        repository.create_quiz_set(quiz_set).await.unwrap();

        repository.set_ready(id, questions()).await.unwrap();
        let set = repository.find_quiz_set(id, owner).await.unwrap().unwrap();
        assert!(set.is_ready());
        assert!(set.error_message.is_none());
        assert_eq!(set.question_count(), 1);

        repository.set_error(id, "regeneration failed").await.unwrap();
        let set = repository.find_quiz_set(id, owner).await.unwrap().unwrap();
        assert_eq!(set.status, crate::QuizStatus::Error);
        assert!(set.questions.is_none());
        assert_eq!(set.error_message.as_deref(), Some("regeneration failed"));
    }

    #[tokio::test]
    async fn set_ready_on_missing_set_fails() {
        let repository = MemoryRepository::new();
        let err = repository
            .set_ready(Uuid::new_v4(), questions())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::QuizSetNotFound { .. }));
    }

    #[tokio::test]
    async fn sessions_list_newest_first_per_owner() {
        let repository = MemoryRepository::new();
        let owner = Uuid::new_v4();
        let quiz_set_id = Uuid::new_v4();

        for score in 0..3 {
            let session = QuizSession::new(owner, quiz_set_id, vec![0], score, 1);
            repository.create_session(session).await.unwrap();
        }
        let other = QuizSession::new(Uuid::new_v4(), quiz_set_id, vec![0], 1, 1);
        repository.create_session(other).await.unwrap();

        let sessions = repository.list_sessions(owner).await.unwrap();
        assert_eq!(sessions.len(), 3);
        assert!(
            sessions
                .windows(2)
                .all(|pair| pair[0].created_at >= pair[1].created_at)
        );
    }
}
