// tests/orchestrator.rs
//
// Provider-chain behavior with scripted providers: skip gate, cache
// idempotence, garbage fallthrough, exhaustion, and rate-limit backoff.

use chrono::{Duration, Utc};
use std::sync::Arc;

use intercom_auto_translator::translate::providers::{
    ProviderError, ScriptedProvider, TranslateProvider,
};
use intercom_auto_translator::translate::Translator;

const FR_TEXT: &str = "Bonjour, j'ai un problème avec ma commande";
const FR_TRANSLATION: &str = "Hello, I have a problem with my order";

fn translator_with(providers: Vec<Arc<ScriptedProvider>>) -> Translator {
    let boxed: Vec<Box<dyn TranslateProvider>> = providers
        .into_iter()
        .map(|p| Box::new(p) as Box<dyn TranslateProvider>)
        .collect();
    Translator::new(
        boxed,
        "en",
        &["en".to_string(), "ru".to_string()],
        600,
    )
}

#[tokio::test]
async fn skip_list_language_never_reaches_a_provider() {
    let p = Arc::new(ScriptedProvider::new(
        "p1",
        vec![ScriptedProvider::ok(FR_TRANSLATION)],
    ));
    let t = translator_with(vec![p.clone()]);

    assert!(t.translate("Спасибо за помощь с заказом", "ru").await.is_none());
    assert!(t.translate("already english text here", "en").await.is_none());
    assert_eq!(p.calls(), 0);
}

#[tokio::test]
async fn second_identical_call_is_served_from_cache() {
    let p = Arc::new(ScriptedProvider::new(
        "p1",
        vec![ScriptedProvider::ok(FR_TRANSLATION)],
    ));
    let t = translator_with(vec![p.clone()]);

    let first = t.translate(FR_TEXT, "fr").await.expect("first result");
    let second = t.translate(FR_TEXT, "fr").await.expect("cached result");
    assert_eq!(first, second);
    assert_eq!(first.text, FR_TRANSLATION);
    assert_eq!(first.source_lang, "fr");
    assert_eq!(first.target_lang, "en");
    assert_eq!(p.calls(), 1, "provider chain must run at most once");
}

#[tokio::test]
async fn cache_expires_after_ttl() {
    let p = Arc::new(ScriptedProvider::new(
        "p1",
        vec![
            ScriptedProvider::ok(FR_TRANSLATION),
            ScriptedProvider::ok(FR_TRANSLATION),
        ],
    ));
    let t = translator_with(vec![p.clone()]);

    let now = Utc::now();
    t.translate_at(FR_TEXT, "fr", now).await.expect("first");
    t.translate_at(FR_TEXT, "fr", now + Duration::seconds(601))
        .await
        .expect("after expiry");
    assert_eq!(p.calls(), 2);
}

#[tokio::test]
async fn echo_response_falls_through_to_next_provider() {
    let echoing = Arc::new(ScriptedProvider::new(
        "echoing",
        vec![ScriptedProvider::ok(FR_TEXT)],
    ));
    let honest = Arc::new(ScriptedProvider::new(
        "honest",
        vec![ScriptedProvider::ok(FR_TRANSLATION)],
    ));
    let t = translator_with(vec![echoing.clone(), honest.clone()]);

    let result = t.translate(FR_TEXT, "fr").await.expect("result");
    assert_eq!(result.text, FR_TRANSLATION);
    assert_eq!(echoing.calls(), 1);
    assert_eq!(honest.calls(), 1);
}

#[tokio::test]
async fn echo_from_last_provider_means_none() {
    let echoing = Arc::new(ScriptedProvider::new(
        "echoing",
        vec![ScriptedProvider::ok(FR_TEXT)],
    ));
    let t = translator_with(vec![echoing.clone()]);

    assert!(t.translate(FR_TEXT, "fr").await.is_none());
    assert_eq!(echoing.calls(), 1);
}

#[tokio::test]
async fn exhaustion_is_cached_as_a_negative() {
    let p1 = Arc::new(ScriptedProvider::new(
        "p1",
        vec![Err(ProviderError::Timeout)],
    ));
    let p2 = Arc::new(ScriptedProvider::new(
        "p2",
        vec![Err(ProviderError::Http("status 500".to_string()))],
    ));
    let t = translator_with(vec![p1.clone(), p2.clone()]);

    assert!(t.translate(FR_TEXT, "fr").await.is_none());
    // Immediate repeat hits the negative sentinel, not the providers.
    assert!(t.translate(FR_TEXT, "fr").await.is_none());
    assert_eq!(p1.calls(), 1);
    assert_eq!(p2.calls(), 1);
}

#[tokio::test]
async fn rate_limited_provider_cools_down_then_recovers() {
    let flaky = Arc::new(ScriptedProvider::new(
        "flaky",
        vec![
            Err(ProviderError::RateLimited),
            ScriptedProvider::ok("A completely usable translation"),
        ],
    ));
    let backup = Arc::new(ScriptedProvider::new(
        "backup",
        vec![
            ScriptedProvider::ok(FR_TRANSLATION),
            ScriptedProvider::ok("Where is my package please"),
        ],
    ));
    let t = translator_with(vec![flaky.clone(), backup.clone()]);

    let now = Utc::now();

    // First call: flaky is rate limited, backup serves the result.
    t.translate_at(FR_TEXT, "fr", now).await.expect("first");
    assert_eq!(flaky.calls(), 1);
    assert_eq!(backup.calls(), 1);

    // Within the cooldown flaky is skipped entirely.
    t.translate_at("Où est mon colis s'il vous plaît", "fr", now + Duration::seconds(5))
        .await
        .expect("second");
    assert_eq!(flaky.calls(), 1, "cooling-down provider must be skipped");
    assert_eq!(backup.calls(), 2);

    // After the cooldown flaky is attempted again.
    t.translate_at("Ma commande est arrivée cassée", "fr", now + Duration::seconds(120))
        .await
        .expect("third");
    assert_eq!(flaky.calls(), 2);
}

#[tokio::test]
async fn auto_hint_resolves_via_local_detection() {
    let p = Arc::new(ScriptedProvider::new(
        "p1",
        vec![ScriptedProvider::ok(FR_TRANSLATION)],
    ));
    let t = translator_with(vec![p.clone()]);

    let result = t.translate(FR_TEXT, "auto").await.expect("result");
    assert_eq!(result.source_lang, "fr");
    assert_eq!(p.calls(), 1);
}

#[tokio::test]
async fn provider_detection_fills_in_unknown_source() {
    // Too short for local detection, so the effective source stays auto and
    // the provider's own detection is recorded.
    let p = Arc::new(ScriptedProvider::new(
        "p1",
        vec![ScriptedProvider::ok_detected("good morning", "de")],
    ));
    let boxed: Vec<Box<dyn TranslateProvider>> =
        vec![Box::new(p.clone()) as Box<dyn TranslateProvider>];
    let t = Translator::new(boxed, "en", &[], 600);

    let result = t.translate("guten morgen", "auto").await.expect("result");
    assert_eq!(result.source_lang, "de");
}
