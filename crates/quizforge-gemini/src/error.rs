//! Error types for the Gemini adapter.

use std::fmt;

/// Result type alias for Gemini operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while talking to the Gemini backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure (connection, timeout, TLS).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("api error: status {status}: {message}")]
    Api { status: u16, message: String },

    /// Generation was refused by a safety filter.
    #[error("generation blocked by safety filter: {reason}")]
    Blocked { reason: String },

    /// The API answered, but not in the shape the contract requires.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates an API error from a status code and message.
    pub fn api(status: u16, message: impl fmt::Display) -> Self {
        Self::Api {
            status,
            message: message.to_string(),
        }
    }

    /// Creates a blocked-generation error.
    pub fn blocked(reason: impl fmt::Display) -> Self {
        Self::Blocked {
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl fmt::Display) -> Self {
        Self::InvalidResponse(message.to_string())
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }
}

impl From<Error> for quizforge_core::Error {
    fn from(err: Error) -> Self {
        let core = match &err {
            Error::Http(_) => quizforge_core::Error::network_error(),
            Error::Serialization(_) => quizforge_core::Error::serialization(),
            Error::Config(_) => quizforge_core::Error::configuration(),
            _ => quizforge_core::Error::external_error(),
        };
        core.with_message(err.to_string()).with_source(err)
    }
}
