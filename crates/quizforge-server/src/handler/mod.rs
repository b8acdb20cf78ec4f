//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
mod quizzes;
mod response;
mod sessions;

use axum::Router;
use axum::response::{IntoResponse, Response};
use tower_http::trace::TraceLayer;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::quizzes::{
    ClientQuestion, QuizQuestionsResponse, QuizStatusResponse, SubmitQuizRequest,
    SubmitQuizResponse, UploadQuizResponse,
};
pub use crate::handler::response::ErrorResponse;
pub use crate::handler::sessions::{SessionDetailsResponse, SessionSummary, SessionsResponse};
use crate::service::ServiceState;

/// Unmatched paths answer with the JSON not-found body.
#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns the complete API [`Router`] over the given state.
pub fn routes(state: ServiceState) -> Router {
    Router::new()
        .merge(quizzes::routes())
        .merge(sessions::routes())
        .merge(monitors::routes())
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
