//! Bearer-token authentication extraction.
//!
//! Token issuance lives outside this service; handlers only need the
//! opaque account id of a verified caller.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::handler::{Error, ErrorKind};
use crate::service::AuthKeys;

/// Identity of a verified caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthClaims {
    /// Opaque account identifier all reads and writes are scoped to.
    pub account_id: Uuid,
}

/// Wire shape of the verified token payload.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Uuid,
    #[allow(dead_code)]
    exp: usize,
}

/// Extractor yielding the verified caller identity.
///
/// Rejects with `401` when the bearer token is missing, malformed, or
/// fails signature/expiry verification.
#[derive(Debug)]
#[must_use]
pub struct AuthState(pub AuthClaims);

impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = AuthKeys::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ErrorKind::MissingAuthToken.into_error())?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ErrorKind::MalformedAuthToken.into_error())?;

        let data = jsonwebtoken::decode::<TokenClaims>(
            token,
            keys.decoding(),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|err| ErrorKind::Unauthorized.with_context(err.to_string()))?;

        Ok(Self(AuthClaims {
            account_id: data.claims.sub,
        }))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use jsonwebtoken::{EncodingKey, Header};
    use serde::Serialize;

    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[derive(Serialize)]
    struct SignedClaims {
        sub: Uuid,
        exp: usize,
    }

    fn token_for(account_id: Uuid) -> String {
        let claims = SignedClaims {
            sub: account_id,
            exp: usize::MAX,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/quizzes");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, _) = builder.body(Body::empty()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn valid_token_yields_account_id() {
        let keys = AuthKeys::from_secret(SECRET);
        let account_id = Uuid::new_v4();
        let header = format!("Bearer {}", token_for(account_id));

        let mut parts = parts_with_auth(Some(&header));
        let AuthState(claims) = AuthState::from_request_parts(&mut parts, &keys)
            .await
            .unwrap();

        assert_eq!(claims.account_id, account_id);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let keys = AuthKeys::from_secret(SECRET);
        let mut parts = parts_with_auth(None);

        let err = AuthState::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingAuthToken);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let keys = AuthKeys::from_secret(SECRET);
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));

        let err = AuthState::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedAuthToken);
    }

    #[tokio::test]
    async fn wrong_signature_is_rejected() {
        let keys = AuthKeys::from_secret(b"a-different-secret");
        let header = format!("Bearer {}", token_for(Uuid::new_v4()));
        let mut parts = parts_with_auth(Some(&header));

        let err = AuthState::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}
