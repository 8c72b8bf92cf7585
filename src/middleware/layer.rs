use axum::Router;
use axum::extract::{Request, State};
use axum::http::Uri;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;
use url::Url;

use super::config::SessionLayerConfig;
use super::cookies::CookieTokenStorage;
use super::extractor::PageLanguage;
use super::state::SessionLayerState;
use crate::session::{SessionResolver, strip_token_param, token_from_url};

/// Wraps `router` in the session layer.
///
/// Every request gets a [`SessionState`](crate::session::SessionState) and a
/// [`PageLanguage`](super::PageLanguage) in its extensions. A request whose
/// URL carries a token is answered with a `303 See Other` to the same URL
/// without the token, after the token has been written to the session cookie.
pub fn with_session<S>(router: Router<S>, config: SessionLayerConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(
        config.into_state(),
        session_layer,
    ))
}

/// The session middleware; see [`with_session`].
pub async fn session_layer(
    State(state): State<SessionLayerState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let settings = &state.settings;
    let url = request_url(request.uri());
    let url_token = url
        .as_ref()
        .and_then(|u| token_from_url(u, &settings.token_param));

    let storage = CookieTokenStorage::new(jar, settings);
    let resolution =
        SessionResolver::with_clock(&storage, state.clock.clone()).resolve(url_token.as_deref());
    let jar = storage.into_jar();

    if resolution.strip_url {
        if let Some(location) = url
            .as_ref()
            .and_then(|u| clean_location(u, &settings.token_param))
        {
            return (jar, Redirect::to(&location)).into_response();
        }
    }

    let language = state.translator.language_from_path(request.uri().path()).to_owned();
    request.extensions_mut().insert(PageLanguage(language));
    request.extensions_mut().insert(resolution.state);
    let response = next.run(request).await;
    (jar, response).into_response()
}

// Origin-form request targets have no scheme or host; resolve them against a
// placeholder origin so the query can be edited with `Url`.
const PLACEHOLDER_ORIGIN: &str = "http://portal.invalid/";

fn request_url(uri: &Uri) -> Option<Url> {
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
    Url::parse(PLACEHOLDER_ORIGIN).ok()?.join(target).ok()
}

fn clean_location(url: &Url, param: &str) -> Option<String> {
    let clean = strip_token_param(url, param)?;
    Some(match clean.query() {
        Some(query) => format!("{}?{query}", clean.path()),
        None => clean.path().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_keeps_path_and_other_params() {
        let uri: Uri = "/uk/settings?token=abc&tab=keys".parse().unwrap();
        let url = request_url(&uri).unwrap();
        assert_eq!(
            clean_location(&url, "token").as_deref(),
            Some("/uk/settings?tab=keys")
        );
    }

    #[test]
    fn location_without_remaining_query() {
        let uri: Uri = "/settings?token=abc".parse().unwrap();
        let url = request_url(&uri).unwrap();
        assert_eq!(clean_location(&url, "token").as_deref(), Some("/settings"));
    }

    #[test]
    fn clean_request_needs_no_redirect() {
        let uri: Uri = "/settings?tab=keys".parse().unwrap();
        let url = request_url(&uri).unwrap();
        assert_eq!(clean_location(&url, "token"), None);
    }
}
