//! Session layer: token capture, URL cleaning and handler gating.

use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use axum::Router;
use bot_settings_portal::middleware::{
    CookieKey, PageLanguage, PageSession, SessionLayerConfig, with_session,
};
use bot_settings_portal::token::encode_unsigned;
use bot_settings_portal::{AccessClaims, ManualClock, PortalConfig, SessionState, Translator};
use serde_json::json;
use tower::ServiceExt;

const NOW: i64 = 1_700_000_000;

fn token(sub: &str, exp: i64) -> String {
    encode_unsigned(&AccessClaims::new("settings-bot", sub).with_expiry(exp)).unwrap()
}

async fn whoami(PageSession(token): PageSession) -> String {
    token.claims().sub.to_string()
}

async fn state_name(Extension(state): Extension<SessionState>) -> &'static str {
    match state {
        SessionState::Valid(_) => "valid",
        SessionState::NotFound => "not_found",
        SessionState::Expired => "expired",
        SessionState::Invalid => "invalid",
        _ => "other",
    }
}

async fn language(PageLanguage(lang): PageLanguage) -> String {
    lang
}

fn app(clock: ManualClock, key: CookieKey) -> Router {
    let portal = PortalConfig::new("https://api.example.com/".parse().unwrap());
    let mut translator = Translator::new("en");
    translator.add_dictionary("en", json!({"hello": "Hello"})).unwrap();
    translator.add_dictionary("uk", json!({"hello": "Привіт"})).unwrap();

    let config = SessionLayerConfig::new(&portal)
        .with_cookie_key(key)
        .with_clock(clock)
        .with_translator(translator);

    let pages = Router::new()
        .route("/{lang}/settings", get(whoami))
        .route("/{lang}/state", get(state_name))
        .route("/{lang}/language", get(language));
    with_session(pages, config)
}

/// `name=value` of the first `Set-Cookie` header.
fn cookie_pair(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_owned()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn url_token_is_captured_and_stripped() {
    let key = CookieKey::generate();
    let app = app(ManualClock::at_unix(NOW), key);
    let t = token("u1", NOW + 600);

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/en/settings?token={t}&tab=keys"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/en/settings?tab=keys"
    );
    let cookie = cookie_pair(&response);
    assert!(cookie.starts_with("access_token="));

    let response = app
        .oneshot(
            Request::get("/en/settings?tab=keys")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "u1");
}

#[tokio::test]
async fn missing_token_rejected_with_notice() {
    let app = app(ManualClock::at_unix(NOW), CookieKey::generate());
    let response = app
        .oneshot(Request::get("/en/settings").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["key"], "errors.session.not_found");
    assert_eq!(body["severity"], "blocking");
    assert_eq!(body["with_help"], true);
}

#[tokio::test]
async fn expired_cookie_is_cleared() {
    let key = CookieKey::generate();
    let clock = ManualClock::at_unix(NOW);
    let app = app(clock.clone(), key);

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/en/state?token={}", token("u1", NOW + 30)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let cookie = cookie_pair(&response);

    clock.advance(time::Duration::seconds(31));
    let response = app
        .oneshot(
            Request::get("/en/state")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let removal = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(removal.contains("Max-Age=0"));
    assert_eq!(body_string(response).await, "expired");
}

#[tokio::test]
async fn tampered_cookie_reads_as_absent() {
    let app = app(ManualClock::at_unix(NOW), CookieKey::generate());
    let response = app
        .oneshot(
            Request::get("/en/state")
                .header(header::COOKIE, "access_token=plaintext-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_string(response).await, "not_found");
}

#[tokio::test]
async fn language_follows_path() {
    let app = app(ManualClock::at_unix(NOW), CookieKey::generate());
    let response = app
        .clone()
        .oneshot(Request::get("/uk/language").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_string(response).await, "uk");

    let response = app
        .oneshot(Request::get("/fr/language").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_string(response).await, "en");
}
