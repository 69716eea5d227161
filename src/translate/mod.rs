// src/translate/mod.rs
//! Translation orchestration: skip gate, cache probe, then an ordered
//! provider chain with per-provider rate-limit cooldowns and a shared
//! acceptance policy. No single free backend is reliable on its own, so the
//! chain short-circuits on the first result that survives validation.

pub mod cache;
pub mod providers;
pub mod validate;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::language::{self, AUTO};
use cache::{CacheKey, TranslationCache};
use providers::{ProviderError, TranslateProvider};
use validate::ResponseValidator;

/// Base cooldown applied after the first rate-limit response; doubles per
/// strike up to `BACKOFF_MAX_STRIKES`.
const BACKOFF_BASE_SECS: i64 = 30;
const BACKOFF_MAX_STRIKES: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Default)]
struct BackoffState {
    strikes: u32,
    blocked_until: Option<DateTime<Utc>>,
}

impl BackoffState {
    fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| now < until)
    }

    fn penalize(&mut self, now: DateTime<Utc>) {
        self.strikes = (self.strikes + 1).min(BACKOFF_MAX_STRIKES);
        let cooldown = BACKOFF_BASE_SECS << (self.strikes - 1);
        self.blocked_until = Some(now + Duration::seconds(cooldown));
    }

    fn reset(&mut self) {
        self.strikes = 0;
        self.blocked_until = None;
    }
}

struct ProviderSlot {
    provider: Box<dyn TranslateProvider>,
    backoff: Mutex<BackoffState>,
}

pub struct Translator {
    slots: Vec<ProviderSlot>,
    cache: Mutex<TranslationCache>,
    validator: ResponseValidator,
    skip_langs: HashSet<String>,
    target_lang: String,
}

impl Translator {
    pub fn new(
        providers: Vec<Box<dyn TranslateProvider>>,
        target_lang: &str,
        skip_langs: &[String],
        cache_ttl_secs: i64,
    ) -> Self {
        Self {
            slots: providers
                .into_iter()
                .map(|provider| ProviderSlot {
                    provider,
                    backoff: Mutex::new(BackoffState::default()),
                })
                .collect(),
            cache: Mutex::new(TranslationCache::new(cache_ttl_secs)),
            validator: ResponseValidator::default(),
            skip_langs: skip_langs.iter().map(|s| s.to_lowercase()).collect(),
            target_lang: target_lang.to_lowercase(),
        }
    }

    pub async fn translate(&self, text: &str, lang_hint: &str) -> Option<TranslationResult> {
        self.translate_at(text, lang_hint, Utc::now()).await
    }

    /// `now` is a parameter so tests can drive TTL and cooldown expiry
    /// deterministically.
    pub async fn translate_at(
        &self,
        text: &str,
        lang_hint: &str,
        now: DateTime<Utc>,
    ) -> Option<TranslationResult> {
        // 1) Resolve the effective source language.
        let effective = if lang_hint == AUTO {
            language::detect_code(text)
                .map(|c| c.to_string())
                .unwrap_or_else(|| AUTO.to_string())
        } else {
            lang_hint.to_lowercase()
        };

        // 2) Skip gate: a normal outcome, not a failure.
        if effective != AUTO
            && (effective == self.target_lang || self.skip_langs.contains(&effective))
        {
            debug!(lang = %effective, "skip-list language, not translating");
            counter!("translate_skipped_total").increment(1);
            return None;
        }

        // 3) Cache probe.
        let key = CacheKey::new(&effective, text);
        if let Some(cached) = self
            .cache
            .lock()
            .expect("cache mutex poisoned")
            .get_at(&key, now)
        {
            counter!("translate_cache_hits_total").increment(1);
            return cached;
        }

        // 4) Provider chain.
        for slot in &self.slots {
            if slot
                .backoff
                .lock()
                .expect("backoff mutex poisoned")
                .is_blocked(now)
            {
                debug!(provider = slot.provider.name(), "cooling down, skipped");
                continue;
            }

            match slot
                .provider
                .attempt(text, &effective, &self.target_lang)
                .await
            {
                Ok(reply) => match self.validator.check(text, &reply.text) {
                    Ok(()) => {
                        slot.backoff
                            .lock()
                            .expect("backoff mutex poisoned")
                            .reset();

                        // Prefer the provider's detection when we went in blind.
                        let source_lang = if effective == AUTO {
                            reply
                                .detected_source
                                .as_deref()
                                .and_then(language::map_hint)
                                .map(|c| c.to_string())
                                .unwrap_or_else(|| AUTO.to_string())
                        } else {
                            effective.clone()
                        };

                        let result = TranslationResult {
                            text: reply.text.trim().to_string(),
                            source_lang,
                            target_lang: self.target_lang.clone(),
                        };
                        self.cache
                            .lock()
                            .expect("cache mutex poisoned")
                            .insert_at(key, Some(result.clone()), now);
                        counter!("translate_accepted_total").increment(1);
                        return Some(result);
                    }
                    Err(rejection) => {
                        warn!(
                            provider = slot.provider.name(),
                            %rejection,
                            "provider output rejected"
                        );
                        counter!("translate_rejected_total").increment(1);
                    }
                },
                Err(ProviderError::RateLimited) => {
                    warn!(provider = slot.provider.name(), "rate limited, backing off");
                    counter!("provider_errors_total").increment(1);
                    slot.backoff
                        .lock()
                        .expect("backoff mutex poisoned")
                        .penalize(now);
                }
                Err(e) => {
                    warn!(provider = slot.provider.name(), error = %e, "provider failed");
                    counter!("provider_errors_total").increment(1);
                }
            }
        }

        // 5) Exhausted: remember the negative outcome so known-bad input does
        // not hammer the chain again within the TTL.
        self.cache
            .lock()
            .expect("cache mutex poisoned")
            .insert_at(key, None, now);
        counter!("translate_exhausted_total").increment(1);
        None
    }
}
