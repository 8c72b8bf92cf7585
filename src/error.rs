use std::time::Duration;

use crate::i18n::TranslationError;
use crate::token::TokenError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    #[cfg(feature = "api")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    #[error("{operation} failed ({status}): {detail}")]
    Api {
        operation: &'static str,
        status: u16,
        code: Option<i64>,
        detail: String,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("'{0}' cannot be used as an API path segment")]
    InvalidPathSegment(String),
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
}

impl Error {
    /// Translation key for presenting this error to the user.
    ///
    /// Server errors carrying a numeric code map to `errors.api.<code>`;
    /// everything else maps to a fixed key per category.
    #[must_use]
    pub fn translation_key(&self) -> String {
        match self {
            Self::Api {
                code: Some(code), ..
            } => format!("errors.api.{code}"),
            Self::Api { status, .. } => status_translation_key(*status).to_owned(),
            Self::Timeout { .. } => "errors.network.timeout".to_owned(),
            #[cfg(feature = "api")]
            Self::Http(_) => "errors.network.connection".to_owned(),
            Self::Token(TokenError::Missing) => "errors.session.not_found".to_owned(),
            Self::Token(TokenError::Expired) => "errors.session.expired".to_owned(),
            Self::Token(TokenError::Malformed(_)) | Self::InvalidPathSegment(_) => {
                "errors.session.invalid".to_owned()
            }
            Self::Config(_) | Self::Translation(_) => "errors.internal".to_owned(),
        }
    }

    /// Whether the error is a timeout rather than a connection or server failure.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            #[cfg(feature = "api")]
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

fn status_translation_key(status: u16) -> &'static str {
    match status {
        401 => "errors.session.unauthorized",
        403 => "errors.forbidden",
        404 => "errors.not_found",
        429 => "errors.rate_limited",
        500..=599 => "errors.server",
        _ => "errors.unknown",
    }
}
