//! End-to-end behaviour of the page session core: token capture,
//! expiry handling, caching and translated notices.

use bot_settings_portal::i18n::{ResolveOptions, Translator, Variables, vars};
use bot_settings_portal::token::{self, encode_unsigned};
use bot_settings_portal::{
    AccessClaims, ManualClock, MemoryTokenStorage, Platform, SessionResolver, SessionState,
    TokenError, TokenStorage, TtlCache,
};
use serde_json::json;
use time::Duration;

const NOW: i64 = 1_700_000_000;

fn token(sub: &str, exp: i64) -> String {
    encode_unsigned(
        &AccessClaims::new("settings-bot", sub)
            .with_platform(Platform::Telegram)
            .with_issued_at(NOW - 60)
            .with_expiry(exp),
    )
    .unwrap()
}

fn translator() -> Translator {
    let mut t = Translator::new("en");
    t.add_json(
        "en",
        r#"{
            "errors": {
                "session": {
                    "not_found": "Open the settings link from the bot.",
                    "expired": "This link has expired.",
                    "invalid": "This link is broken."
                }
            },
            "sponsorships": { "count": { "one": "{count} sponsored user", "other": "{count} sponsored users" } }
        }"#,
    )
    .unwrap();
    t.add_json(
        "uk",
        r#"{
            "errors": {
                "session": {
                    "not_found": "Відкрийте посилання з бота.",
                    "expired": "Посилання застаріло.",
                    "invalid": "Посилання пошкоджене."
                }
            },
            "sponsorships": { "count": {
                "one": "{count} користувач", "few": "{count} користувачі", "many": "{count} користувачів"
            } }
        }"#,
    )
    .unwrap();
    t
}

#[test]
fn empty_token_is_missing() {
    let clock = ManualClock::at_unix(NOW);
    assert_eq!(
        token::decode::<AccessClaims>("", &clock).unwrap_err(),
        TokenError::Missing
    );
}

#[test]
fn expired_token_fails_and_clears_storage() {
    let storage = MemoryTokenStorage::new();
    let resolver = SessionResolver::with_clock(storage.clone(), ManualClock::at_unix(NOW));
    storage.set(&token("u1", NOW - 10));

    let resolution = resolver.resolve(None);
    assert_eq!(resolution.state, SessionState::Expired);
    assert!(!storage.has());
}

#[test]
fn url_token_supersedes_persisted_token() {
    let storage = MemoryTokenStorage::new();
    let resolver = SessionResolver::with_clock(storage.clone(), ManualClock::at_unix(NOW));
    let t1 = token("u1", NOW + 600);
    let t2 = token("u2", NOW + 600);
    storage.set(&t1);

    let resolution = resolver.resolve(Some(&t2));
    assert!(resolution.strip_url);
    assert_eq!(resolution.state.claims().unwrap().sub.as_str(), "u2");
    assert_eq!(storage.get(), Some(t2));
    assert_ne!(storage.get(), Some(t1));
}

#[test]
fn persisted_only_resolution_is_stable() {
    let storage = MemoryTokenStorage::new();
    let clock = ManualClock::at_unix(NOW);
    let t1 = token("u1", NOW + 600);
    storage.set(&t1);

    let a = SessionResolver::with_clock(storage.clone(), clock.clone()).resolve(None);
    let b = SessionResolver::with_clock(storage.clone(), clock).resolve(None);
    assert_eq!(a, b);
    assert_eq!(a.state.token().unwrap().raw(), t1);
}

#[test]
fn cache_returns_value_until_ttl() {
    let clock = ManualClock::at_unix(NOW);
    let cache: TtlCache<String, serde_json::Value, _> =
        TtlCache::with_clock(Duration::minutes(5), clock.clone());

    cache.set("u1".into(), json!({"a": 1}));
    assert_eq!(cache.get(&"u1".into()), Some(json!({"a": 1})));

    clock.advance(Duration::minutes(5) + Duration::seconds(1));
    assert_eq!(cache.get(&"u1".into()), None);
}

#[test]
fn session_notices_translate_in_page_language() {
    let t = translator();
    let notice = SessionState::Expired.notice().unwrap();
    let text = t.text(notice.key, Some("uk")).unwrap();
    assert_eq!(text, "Посилання застаріло.");
    assert!(notice.with_help);
}

#[test]
fn plural_counts_per_language() {
    let t = translator();
    let en = |n: i64| {
        t.resolve("sponsorships.count", &Variables::new(), ResolveOptions::count(n))
            .unwrap()
    };
    assert_eq!(en(1), "1 sponsored user");
    assert_eq!(en(0), "0 sponsored users");

    let uk = |n: i64| {
        t.resolve(
            "sponsorships.count",
            &vars([("count", n)]),
            ResolveOptions::language("uk"),
        )
        .unwrap()
    };
    assert_eq!(uk(1), "1 користувач");
    assert_eq!(uk(3), "3 користувачі");
    assert_eq!(uk(5), "5 користувачів");
}

#[test]
fn plural_without_count_throws() {
    assert!(translator().text("sponsorships.count", None).is_err());
}

#[test]
fn missing_translation_throws() {
    assert!(translator().text("errors.not_found", None).is_err());
}

#[test]
fn bundled_dictionaries_have_parity() {
    let report = translator().parity_report();
    assert!(report.is_clean(), "{:?}", report.issues);
}
