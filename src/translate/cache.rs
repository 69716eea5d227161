// src/translate/cache.rs
//! In-memory TTL cache for translation results. A stored `None` is the
//! negative sentinel: "this input is known not to produce a usable
//! translation", distinct from an absent entry.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use super::TranslationResult;

/// Cache keys use a bounded text prefix so pathological message lengths do
/// not bloat the map.
const KEY_PREFIX_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lang: String,
    prefix: String,
}

impl CacheKey {
    pub fn new(lang: &str, text: &str) -> Self {
        Self {
            lang: lang.to_string(),
            prefix: text.chars().take(KEY_PREFIX_CHARS).collect(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: Option<TranslationResult>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct TranslationCache {
    ttl: Duration,
    map: HashMap<CacheKey, Entry>,
}

impl TranslationCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.max(1)),
            map: HashMap::new(),
        }
    }

    /// Outer `None` = miss; `Some(None)` = negative sentinel hit.
    pub fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Option<TranslationResult>> {
        let entry = self.map.get(key)?;
        if entry.expires_at <= now {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert_at(
        &mut self,
        key: CacheKey,
        value: Option<TranslationResult>,
        now: DateTime<Utc>,
    ) {
        // Opportunistic purge keeps the map bounded without a sweeper task.
        self.map.retain(|_, e| e.expires_at > now);
        self.map.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str) -> TranslationResult {
        TranslationResult {
            text: text.to_string(),
            source_lang: "fr".to_string(),
            target_lang: "en".to_string(),
        }
    }

    #[test]
    fn hit_before_ttl_miss_after() {
        let mut c = TranslationCache::new(600);
        let now = Utc::now();
        let key = CacheKey::new("fr", "bonjour tout le monde");
        c.insert_at(key.clone(), Some(result("hello everyone")), now);

        let hit = c.get_at(&key, now + Duration::seconds(599));
        assert_eq!(hit.unwrap().unwrap().text, "hello everyone");

        assert!(c.get_at(&key, now + Duration::seconds(601)).is_none());
    }

    #[test]
    fn negative_sentinel_is_distinct_from_miss() {
        let mut c = TranslationCache::new(600);
        let now = Utc::now();
        let key = CacheKey::new("auto", "untranslatable junk");
        assert!(c.get_at(&key, now).is_none());

        c.insert_at(key.clone(), None, now);
        assert_eq!(c.get_at(&key, now), Some(None));
    }

    #[test]
    fn long_texts_share_a_prefix_key() {
        let long_a = format!("{} tail-a", "x".repeat(200));
        let long_b = format!("{} tail-b", "x".repeat(200));
        assert_eq!(CacheKey::new("de", &long_a), CacheKey::new("de", &long_b));
        assert_ne!(CacheKey::new("de", &long_a), CacheKey::new("fr", &long_a));
    }

    #[test]
    fn insert_purges_expired_entries() {
        let mut c = TranslationCache::new(10);
        let now = Utc::now();
        for i in 0..50 {
            c.insert_at(CacheKey::new("fr", &format!("text {i}")), None, now);
        }
        c.insert_at(CacheKey::new("fr", "fresh"), None, now + Duration::seconds(11));
        assert_eq!(c.len(), 1);
    }
}
