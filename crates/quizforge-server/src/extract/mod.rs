//! Custom axum extractors.

mod auth;
mod path;

pub use auth::{AuthClaims, AuthState};
pub use path::Path;
