//! Quiz upload, status polling, question delivery, and grading handlers.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use quizforge_data::{
    AnswerReview, QuizRepository, QuizSession, QuizSet, QuizStatus, QuizStore, grade,
};
use quizforge_nats::object::{SourceKey, SourceStore};
use quizforge_nats::queue::{GenerationJob, GenerationQueue, QuizJob};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthState, Path};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for quiz handler operations.
const TRACING_TARGET: &str = "quizforge_server::handler::quizzes";

/// Multipart field carrying the source document.
const UPLOAD_FIELD: &str = "pdfFile";

/// Only PDFs are accepted for generation.
const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Hard ceiling on uploaded document size: 15 MiB.
const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

/// Headroom for multipart framing on top of the document ceiling.
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// `Path` params for `{quizSetId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSetPathParams {
    /// Unique identifier of the quiz set.
    pub quiz_set_id: Uuid,
}

/// Response returned when an upload is accepted for generation.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuizResponse {
    /// Identifier to poll for generation status.
    pub quiz_set_id: Uuid,
}

/// Response for a status poll.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatusResponse {
    /// Identifier of the quiz set.
    pub quiz_set_id: Uuid,
    /// Current generation status.
    pub status: QuizStatus,
    /// Failure cause, present only when status is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Generated question count, present only when status is `ready`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_count: Option<usize>,
}

/// A question as shown before grading: no answer key.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientQuestion {
    /// The text of the question.
    pub question_text: String,
    /// Candidate answers in display order.
    pub options: Vec<String>,
}

/// Response carrying the questions of a ready quiz set.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionsResponse {
    /// Identifier of the quiz set.
    pub quiz_set_id: Uuid,
    /// Original source document name.
    pub source_name: String,
    /// Questions in order, answer key withheld.
    pub questions: Vec<ClientQuestion>,
}

/// Request body for grading an attempt.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    /// One 0-based answer index per question, in question order.
    #[validate(length(min = 1))]
    pub user_answers: Vec<usize>,
}

/// Response carrying the graded breakdown of an attempt.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    /// Per-question review, answer key now included.
    pub results: Vec<AnswerReview>,
    /// Number of correct answers.
    pub score: usize,
    /// Total number of questions graded.
    pub total_questions: usize,
    /// Identifier of the persisted attempt record.
    pub quiz_session_id: Uuid,
}

/// Accepts a PDF upload and queues quiz generation.
///
/// Validation happens before any core work: only `application/pdf` within
/// the size ceiling enters the pipeline. On success the quiz set is
/// `processing` and the caller polls the status endpoint; the request
/// never waits on generation.
#[tracing::instrument(skip_all)]
async fn upload_quiz(
    State(repository): State<QuizStore>,
    State(sources): State<SourceStore>,
    State(queue): State<GenerationQueue>,
    AuthState(claims): AuthState,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadQuizResponse>)> {
    let mut upload: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        ErrorKind::BadRequest
            .with_message("Invalid multipart data")
            .with_context(err.to_string())
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        if field.content_type() != Some(PDF_CONTENT_TYPE) {
            return Err(ErrorKind::BadRequest
                .with_message("File must be a PDF"));
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "upload.pdf".to_string());

        let data = field.bytes().await.map_err(|err| {
            ErrorKind::BadRequest
                .with_message("Failed to read uploaded file")
                .with_context(err.to_string())
        })?;

        upload = Some((filename, data));
        break;
    }

    let Some((filename, data)) = upload else {
        return Err(ErrorKind::BadRequest
            .with_message("No file uploaded"));
    };

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ErrorKind::BadRequest
            .with_message("File exceeds the 15 MiB upload limit"));
    }
    if data.is_empty() {
        return Err(ErrorKind::BadRequest
            .with_message("Uploaded file is empty"));
    }

    // Hashing and the PDF integrity check run inside the store call
    // itself, not as a persistence hook.
    let key = SourceKey::for_upload(claims.account_id);
    let stored = sources.put(&key, &data[..]).await.map_err(|err| match err {
        quizforge_nats::Error::InvalidSource { reason } => ErrorKind::BadRequest
            .with_message("File is not a valid PDF")
            .with_context(reason),
        other => other.into(),
    })?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %claims.account_id,
        filename = %filename,
        size = stored.size,
        sha256 = %stored.sha256_hex,
        "Accepted source document"
    );

    let quiz_set = QuizSet::new(claims.account_id, key.to_string(), filename.clone());
    let quiz_set_id = quiz_set.id;
    repository.create_quiz_set(quiz_set).await?;

    let job = QuizJob::Generate(GenerationJob::new(
        quiz_set_id,
        claims.account_id,
        key.to_string(),
        filename,
    ));

    if let Err(err) = queue.publish(&job).await {
        // Never leave the record sitting at `processing` with no job.
        if let Err(update_err) = repository
            .set_error(quiz_set_id, "failed to queue generation job")
            .await
        {
            tracing::error!(
                target: TRACING_TARGET,
                quiz_set_id = %quiz_set_id,
                error = %update_err,
                "Failed to record enqueue failure"
            );
        }
        return Err(ErrorKind::InternalServerError
            .with_message("Failed to queue quiz generation")
            .with_context(err.to_string()));
    }

    tracing::info!(
        target: TRACING_TARGET,
        quiz_set_id = %quiz_set_id,
        account_id = %claims.account_id,
        "Accepted quiz generation request"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadQuizResponse { quiz_set_id }),
    ))
}

/// Reports the current generation status of a quiz set.
#[tracing::instrument(skip_all)]
async fn quiz_status(
    State(repository): State<QuizStore>,
    Path(params): Path<QuizSetPathParams>,
    AuthState(claims): AuthState,
) -> Result<Json<QuizStatusResponse>> {
    let quiz_set = repository
        .find_quiz_set(params.quiz_set_id, claims.account_id)
        .await?
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Quiz set not found")
                .with_resource("quiz_set")
        })?;

    Ok(Json(status_response(&quiz_set)))
}

/// Shapes the status poll response for a quiz set.
fn status_response(quiz_set: &QuizSet) -> QuizStatusResponse {
    QuizStatusResponse {
        quiz_set_id: quiz_set.id,
        status: quiz_set.status,
        error_message: match quiz_set.status {
            QuizStatus::Error => quiz_set.error_message.clone(),
            _ => None,
        },
        question_count: match quiz_set.status {
            QuizStatus::Ready => Some(quiz_set.question_count()),
            _ => None,
        },
    }
}

/// Returns the questions of a ready quiz set, answer key withheld.
#[tracing::instrument(skip_all)]
async fn quiz_questions(
    State(repository): State<QuizStore>,
    Path(params): Path<QuizSetPathParams>,
    AuthState(claims): AuthState,
) -> Result<Json<QuizQuestionsResponse>> {
    let quiz_set = repository
        .find_quiz_set(params.quiz_set_id, claims.account_id)
        .await?
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Quiz set not found")
                .with_resource("quiz_set")
        })?;

    if !quiz_set.is_ready() {
        return Err(ErrorKind::BadRequest
            .with_message("Quiz set is not ready"));
    }

    let questions = quiz_set
        .questions
        .unwrap_or_default()
        .into_iter()
        .map(|question| ClientQuestion {
            question_text: question.question_text,
            options: question.options,
        })
        .collect();

    Ok(Json(QuizQuestionsResponse {
        quiz_set_id: quiz_set.id,
        source_name: quiz_set.source_name,
        questions,
    }))
}

/// Grades a full answer sequence and persists the attempt.
#[tracing::instrument(skip_all)]
async fn submit_quiz(
    State(repository): State<QuizStore>,
    Path(params): Path<QuizSetPathParams>,
    AuthState(claims): AuthState,
    Json(request): Json<SubmitQuizRequest>,
) -> Result<Json<SubmitQuizResponse>> {
    request.validate().map_err(|err| {
        ErrorKind::BadRequest
            .with_message("Invalid or missing answers array")
            .with_context(err.to_string())
    })?;

    let quiz_set = repository
        .find_quiz_set(params.quiz_set_id, claims.account_id)
        .await?
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Quiz set not found")
                .with_resource("quiz_set")
        })?;

    if !quiz_set.is_ready() {
        return Err(ErrorKind::BadRequest
            .with_message("Quiz set is not ready"));
    }

    let questions = quiz_set.questions.unwrap_or_default();
    let graded = grade(&questions, &request.user_answers)?;

    let session = QuizSession::new(
        claims.account_id,
        quiz_set.id,
        request.user_answers,
        graded.score,
        graded.total_questions,
    );
    let quiz_session_id = session.id;
    repository.create_session(session).await?;

    tracing::info!(
        target: TRACING_TARGET,
        quiz_set_id = %quiz_set.id,
        quiz_session_id = %quiz_session_id,
        score = graded.score,
        total_questions = graded.total_questions,
        "Graded quiz attempt"
    );

    Ok(Json(SubmitQuizResponse {
        results: graded.reviews,
        score: graded.score,
        total_questions: graded.total_questions,
        quiz_session_id,
    }))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/quizzes", post(upload_quiz))
        .route("/quizzes/{quizSetId}/status", get(quiz_status))
        .route("/quizzes/{quizSetId}", get(quiz_questions))
        .route("/quizzes/{quizSetId}/submit", post(submit_quiz))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use quizforge_core::QuizQuestion;

    use super::*;

    fn ready_quiz_set() -> QuizSet {
        let mut quiz_set = QuizSet::new(Uuid::new_v4(), "key", "notes.pdf");
        quiz_set.mark_ready(vec![QuizQuestion {
            question_text: "Q?".to_string(),
            options: vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
            correct_answer_index: 2,
        }]);
        quiz_set
    }

    #[test]
    fn client_question_never_carries_the_answer_key() {
        let question = ClientQuestion {
            question_text: "Q?".to_string(),
            options: vec!["A".to_string(), "B".to_string()],
        };

        let json = serde_json::to_value(&question).unwrap();
        assert!(json.get("correctAnswerIndex").is_none());
        assert_eq!(json.get("questionText").and_then(|v| v.as_str()), Some("Q?"));
    }

    #[test]
    fn status_response_shapes_ready_sets() {
        let response = status_response(&ready_quiz_set());
        assert_eq!(response.status, QuizStatus::Ready);
        assert_eq!(response.question_count, Some(1));
        assert!(response.error_message.is_none());
    }

    #[test]
    fn status_response_shapes_failed_sets() {
        let mut quiz_set = QuizSet::new(Uuid::new_v4(), "key", "notes.pdf");
        quiz_set.mark_error("generation blocked");

        let response = status_response(&quiz_set);
        assert_eq!(response.status, QuizStatus::Error);
        assert_eq!(response.error_message.as_deref(), Some("generation blocked"));
        assert!(response.question_count.is_none());
    }

    #[test]
    fn status_response_hides_details_while_processing() {
        let quiz_set = QuizSet::new(Uuid::new_v4(), "key", "notes.pdf");

        let response = status_response(&quiz_set);
        assert_eq!(response.status, QuizStatus::Processing);
        assert!(response.error_message.is_none());
        assert!(response.question_count.is_none());
    }
}
