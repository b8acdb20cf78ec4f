//! Attempt history handlers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use jiff::Timestamp;
use quizforge_data::{QuizRepository, QuizSession, QuizSet, QuizStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::{AuthState, Path};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for session handler operations.
const TRACING_TARGET: &str = "quizforge_server::handler::sessions";

/// `Path` params for `{sessionId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPathParams {
    /// Unique identifier of the quiz session.
    pub session_id: Uuid,
}

/// Quiz set context attached to a session listing.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizInfo {
    /// Identifier of the quiz set the attempt was taken against.
    pub quiz_set_id: Uuid,
    /// Original source document name.
    pub source_name: String,
    /// When the quiz set was created.
    pub quiz_created_at: Timestamp,
}

/// One attempt in the history listing.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Identifier of the attempt.
    pub session_id: Uuid,
    /// Number of correct answers.
    pub score: usize,
    /// Question count at grading time.
    pub total_questions: usize,
    /// When the attempt was graded.
    pub taken_at: Timestamp,
    /// Quiz set context; absent if the set has since disappeared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_info: Option<QuizInfo>,
}

/// Response listing the caller's attempts.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsResponse {
    /// Number of attempts returned.
    pub count: usize,
    /// Attempts, newest first.
    pub sessions: Vec<SessionSummary>,
}

/// Per-question review within a session detail view.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuestionReview {
    /// The text of the question.
    pub question_text: String,
    /// Candidate answers in display order.
    pub options: Vec<String>,
    /// The answer the user picked, absent if the stored sequence is short.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<usize>,
    /// 0-based index of the correct answer.
    pub correct_answer_index: usize,
    /// Whether the user's answer was correct.
    pub is_correct: bool,
}

/// Response carrying one attempt with its full review.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailsResponse {
    /// Identifier of the attempt.
    pub session_id: Uuid,
    /// Number of correct answers.
    pub score: usize,
    /// Question count at grading time.
    pub total_questions: usize,
    /// When the attempt was graded.
    pub taken_at: Timestamp,
    /// Quiz set context; absent if the set has since disappeared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_info: Option<QuizInfo>,
    /// Per-question review; empty if the quiz set is gone.
    pub questions: Vec<SessionQuestionReview>,
}

fn quiz_info(quiz_set: &QuizSet) -> QuizInfo {
    QuizInfo {
        quiz_set_id: quiz_set.id,
        source_name: quiz_set.source_name.clone(),
        quiz_created_at: quiz_set.created_at,
    }
}

/// Lists the caller's graded attempts, newest first.
#[tracing::instrument(skip_all)]
async fn list_sessions(
    State(repository): State<QuizStore>,
    AuthState(claims): AuthState,
) -> Result<Json<SessionsResponse>> {
    let sessions = repository.list_sessions(claims.account_id).await?;

    let mut summaries = Vec::with_capacity(sessions.len());
    for session in sessions {
        let quiz_set = repository
            .find_quiz_set(session.quiz_set_id, claims.account_id)
            .await?;
        summaries.push(SessionSummary {
            session_id: session.id,
            score: session.score,
            total_questions: session.total_questions,
            taken_at: session.created_at,
            quiz_info: quiz_set.as_ref().map(quiz_info),
        });
    }

    tracing::debug!(
        target: TRACING_TARGET,
        account_id = %claims.account_id,
        count = summaries.len(),
        "Listed quiz sessions"
    );

    Ok(Json(SessionsResponse {
        count: summaries.len(),
        sessions: summaries,
    }))
}

/// Returns one graded attempt with its per-question review.
#[tracing::instrument(skip_all)]
async fn session_details(
    State(repository): State<QuizStore>,
    Path(params): Path<SessionPathParams>,
    AuthState(claims): AuthState,
) -> Result<Json<SessionDetailsResponse>> {
    let session = repository
        .find_session(params.session_id, claims.account_id)
        .await?
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Quiz session not found")
                .with_resource("quiz_session")
        })?;

    let quiz_set = repository
        .find_quiz_set(session.quiz_set_id, claims.account_id)
        .await?;

    let questions = quiz_set
        .as_ref()
        .map(|set| question_reviews(set, &session))
        .unwrap_or_default();

    Ok(Json(SessionDetailsResponse {
        session_id: session.id,
        score: session.score,
        total_questions: session.total_questions,
        taken_at: session.created_at,
        quiz_info: quiz_set.as_ref().map(quiz_info),
        questions,
    }))
}

/// Pairs the stored answer sequence back up with the quiz questions.
fn question_reviews(quiz_set: &QuizSet, session: &QuizSession) -> Vec<SessionQuestionReview> {
    quiz_set
        .questions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let user_answer = session.user_answers.get(index).copied();
            SessionQuestionReview {
                question_text: question.question_text.clone(),
                options: question.options.clone(),
                user_answer,
                correct_answer_index: question.correct_answer_index,
                is_correct: user_answer == Some(question.correct_answer_index),
            }
        })
        .collect()
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/{sessionId}", get(session_details))
}

#[cfg(test)]
mod tests {
    use quizforge_core::QuizQuestion;

    use super::*;

    fn quiz_set_with_questions() -> QuizSet {
        let mut quiz_set = QuizSet::new(Uuid::new_v4(), "key", "notes.pdf");
        quiz_set.mark_ready(vec![
            QuizQuestion {
                question_text: "First?".to_string(),
                options: vec![
                    "A".to_string(),
                    "B".to_string(),
                    "C".to_string(),
                    "D".to_string(),
                ],
                correct_answer_index: 0,
            },
            QuizQuestion {
                question_text: "Second?".to_string(),
                options: vec![
                    "A".to_string(),
                    "B".to_string(),
                    "C".to_string(),
                    "D".to_string(),
                ],
                correct_answer_index: 3,
            },
        ]);
        quiz_set
    }

    #[test]
    fn reviews_pair_answers_with_questions() {
        let quiz_set = quiz_set_with_questions();
        let session = QuizSession::new(quiz_set.owner_id, quiz_set.id, vec![0, 1], 1, 2);

        let reviews = question_reviews(&quiz_set, &session);
        assert_eq!(reviews.len(), 2);
        assert!(reviews[0].is_correct);
        assert!(!reviews[1].is_correct);
        assert_eq!(reviews[1].user_answer, Some(1));
        assert_eq!(reviews[1].correct_answer_index, 3);
    }

    #[test]
    fn short_answer_sequences_never_panic() {
        let quiz_set = quiz_set_with_questions();
        let session = QuizSession::new(quiz_set.owner_id, quiz_set.id, vec![0], 1, 2);

        let reviews = question_reviews(&quiz_set, &session);
        assert_eq!(reviews[1].user_answer, None);
        assert!(!reviews[1].is_correct);
    }
}
