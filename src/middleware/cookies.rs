use std::sync::{Mutex, PoisonError};

use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use super::config::SessionSettings;
use crate::storage::TokenStorage;

/// Create the token cookie.
///
/// No `Max-Age`: a browser-session cookie, gone when the browser closes.
pub(super) fn token_cookie(name: &str, raw: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), raw.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .build()
}

/// Create removal cookie for the token.
pub(super) fn clear_token_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// [`TokenStorage`] over the request's private cookie jar.
///
/// Writes accumulate in the jar, which the layer returns with the response.
pub(super) struct CookieTokenStorage {
    jar: Mutex<PrivateCookieJar>,
    name: String,
    secure: bool,
}

impl CookieTokenStorage {
    pub(super) fn new(jar: PrivateCookieJar, settings: &SessionSettings) -> Self {
        Self {
            jar: Mutex::new(jar),
            name: settings.cookie_name.clone(),
            secure: settings.secure_cookies,
        }
    }

    pub(super) fn into_jar(self) -> PrivateCookieJar {
        self.jar.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, op: impl FnOnce(PrivateCookieJar) -> PrivateCookieJar) {
        match self.jar.lock() {
            Ok(mut jar) => *jar = op(jar.clone()),
            Err(e) => {
                tracing::warn!(cookie = %self.name, error = %e, "Cookie jar unavailable on write");
            }
        }
    }
}

impl TokenStorage for CookieTokenStorage {
    fn get(&self) -> Option<String> {
        match self.jar.lock() {
            Ok(jar) => jar
                .get(&self.name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(cookie = %self.name, error = %e, "Cookie jar unavailable on read");
                None
            }
        }
    }

    fn set(&self, raw: &str) {
        let cookie = token_cookie(&self.name, raw, self.secure);
        self.update(|jar| jar.add(cookie));
    }

    fn clear(&self) {
        let cookie = clear_token_cookie(&self.name);
        self.update(|jar| jar.add(cookie));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_cookie_is_session_scoped() {
        let cookie = token_cookie("access_token", "abc", true);
        assert_eq!(cookie.value(), "abc");
        assert!(cookie.max_age().is_none());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_token_cookie("access_token");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.value(), "");
    }
}
