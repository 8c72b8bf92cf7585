//! Page session resolution.
//!
//! A page can receive its token two ways: persisted in the tab's storage by
//! an earlier visit, or in the `token` query parameter of a fresh link sent
//! by the bot. [`SessionResolver`] picks the authoritative one, persists it,
//! decodes it and reports the outcome as a [`SessionState`].

use url::Url;

use crate::clock::{Clock, SystemClock};
use crate::notice::Notice;
use crate::storage::TokenStorage;
use crate::token::{self, AccessClaims, DecodedToken, TokenError};

/// Default query parameter carrying a freshly issued token.
pub const DEFAULT_TOKEN_PARAM: &str = "token";

/// Outcome of session resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionState {
    Valid(DecodedToken<AccessClaims>),
    NotFound,
    Expired,
    Invalid,
}

impl SessionState {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    #[must_use]
    pub fn token(&self) -> Option<&DecodedToken<AccessClaims>> {
        match self {
            Self::Valid(token) => Some(token),
            _ => None,
        }
    }

    #[must_use]
    pub fn claims(&self) -> Option<&AccessClaims> {
        self.token().map(DecodedToken::claims)
    }

    /// The banner to show for this state, if any.
    ///
    /// Every error state blocks the page: without a token no API call can
    /// succeed. Expired and missing tokens get the help text explaining how
    /// to request a new link from the bot.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Valid(_) => None,
            Self::NotFound => Some(Notice::blocking("errors.session.not_found").with_help()),
            Self::Expired => Some(Notice::blocking("errors.session.expired").with_help()),
            Self::Invalid => Some(Notice::blocking("errors.session.invalid")),
        }
    }
}

impl From<TokenError> for SessionState {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Missing => Self::NotFound,
            TokenError::Expired => Self::Expired,
            TokenError::Malformed(_) => Self::Invalid,
        }
    }
}

/// Result of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub state: SessionState,
    /// The URL still carries a token and should be replaced by its clean form.
    pub strip_url: bool,
}

/// Reconciles the URL token with the persisted one.
#[derive(Debug, Clone)]
pub struct SessionResolver<S, C = SystemClock> {
    storage: S,
    clock: C,
}

impl<S: TokenStorage> SessionResolver<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            clock: SystemClock,
        }
    }
}

impl<S: TokenStorage, C: Clock> SessionResolver<S, C> {
    #[must_use]
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self { storage, clock }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Resolves the session for a page load.
    ///
    /// A non-empty `url_token` always wins and is written to storage before
    /// decoding. An expired token is cleared from storage. Never fails:
    /// codec errors become [`SessionState`] variants.
    pub fn resolve(&self, url_token: Option<&str>) -> Resolution {
        let url_token = url_token.map(str::trim).filter(|t| !t.is_empty());
        let persisted = self.storage.get();

        let (chosen, strip_url) = match url_token {
            Some(fresh) => {
                if persisted.as_deref() != Some(fresh) {
                    tracing::debug!(replaced = persisted.is_some(), "Captured token from URL");
                    self.storage.set(fresh);
                }
                (Some(fresh.to_owned()), true)
            }
            None => (persisted, false),
        };

        let state = match chosen {
            None => SessionState::NotFound,
            Some(raw) => self.decode(&raw),
        };

        Resolution { state, strip_url }
    }

    /// Resolves using the token query parameter of `url`.
    pub fn resolve_url(&self, url: &Url, param: &str) -> Resolution {
        let url_token = token_from_url(url, param);
        self.resolve(url_token.as_deref())
    }

    fn decode(&self, raw: &str) -> SessionState {
        match token::decode::<AccessClaims>(raw, &self.clock) {
            Ok(token) => SessionState::Valid(token),
            Err(TokenError::Expired) => {
                tracing::info!("Stored token expired, clearing");
                self.storage.clear();
                SessionState::Expired
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected session token");
                e.into()
            }
        }
    }
}

/// Reads the token query parameter; the first non-empty occurrence wins.
#[must_use]
pub fn token_from_url(url: &Url, param: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == param && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// The URL with every `param` query pair removed.
///
/// Returns `None` when the URL carries no such parameter, so callers can
/// skip navigation when the URL is already clean.
#[must_use]
pub fn strip_token_param(url: &Url, param: &str) -> Option<Url> {
    if !url.query_pairs().any(|(k, _)| k == param) {
        return None;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != param)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut clean = url.clone();
    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(kept);
    }
    Some(clean)
}
