//! Path extraction with a JSON rejection body.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// `Path` extractor that rejects malformed parameters with a `400` JSON
/// body instead of axum's plain-text default.
///
/// A syntactically invalid id is a client error and must be told apart
/// from an id that simply doesn't resolve.
#[must_use]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(ErrorKind::BadRequest
                .with_message("Invalid path parameter")
                .with_context(rejection.to_string())),
        }
    }
}
