use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::notice::Notice;
use crate::session::SessionState;

const INTERNAL: Notice = Notice::blocking("errors.internal");

/// Rejection for handlers that need a valid session.
#[derive(Debug, thiserror::Error)]
pub enum SessionRejection {
    /// No token in the URL or the session cookie.
    #[error("Not authenticated")]
    NotFound,

    /// The token expired; the cookie has already been cleared.
    #[error("Session expired")]
    Expired,

    /// The token could not be decoded.
    #[error("Invalid session token")]
    Invalid,

    /// The handler is not behind the session layer.
    #[error("Session layer not installed")]
    LayerMissing,
}

impl SessionRejection {
    /// Rejection for a non-valid state; `None` for a valid one.
    #[must_use]
    pub fn from_state(state: &SessionState) -> Option<Self> {
        match state {
            SessionState::Valid(_) => None,
            SessionState::NotFound => Some(Self::NotFound),
            SessionState::Expired => Some(Self::Expired),
            SessionState::Invalid => Some(Self::Invalid),
        }
    }

    /// The banner the page should show; the same one
    /// [`SessionState::notice`] gives for the rejected state.
    #[must_use]
    pub fn notice(&self) -> Notice {
        let state = match self {
            Self::NotFound => SessionState::NotFound,
            Self::Expired => SessionState::Expired,
            Self::Invalid => SessionState::Invalid,
            Self::LayerMissing => return INTERNAL,
        };
        state.notice().unwrap_or(INTERNAL)
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound | Self::Expired | Self::Invalid => {
                (StatusCode::UNAUTHORIZED, Json(self.notice())).into_response()
            }
            Self::LayerMissing => {
                tracing::error!(error = %self, "Session internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(self.notice())).into_response()
            }
        }
    }
}
