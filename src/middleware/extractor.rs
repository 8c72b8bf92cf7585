use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::SessionRejection;
use crate::session::SessionState;
use crate::token::{AccessClaims, DecodedToken};

/// Valid page session, placed in the request by the session layer.
///
/// Use as an Axum extractor in route handlers. Rejects with
/// [`SessionRejection`] if the session is missing, expired or invalid.
///
/// # Example
///
/// ```rust,ignore
/// async fn settings(PageSession(token): PageSession) -> impl IntoResponse {
///     format!("Hello, user {}", token.claims().sub)
/// }
///
/// // Pages that render their own notice take the raw state instead:
/// async fn landing(Extension(state): Extension<SessionState>) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct PageSession(pub DecodedToken<AccessClaims>);

impl<S: Send + Sync> FromRequestParts<S> for PageSession {
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<SessionState>()
            .ok_or(SessionRejection::LayerMissing)?;

        match state {
            SessionState::Valid(token) => Ok(Self(token.clone())),
            other => Err(SessionRejection::from_state(other).unwrap_or(SessionRejection::Invalid)),
        }
    }
}

/// Interface language of the page, from the first path segment.
///
/// Set by the session layer; falls back to the translator's default language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLanguage(pub String);

impl<S: Send + Sync> FromRequestParts<S> for PageLanguage {
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<PageLanguage>()
            .cloned()
            .ok_or(SessionRejection::LayerMissing)
    }
}
