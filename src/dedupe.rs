// src/dedupe.rs
//! Short-lived duplicate suppression. Intercom redelivers webhooks on slow
//! acknowledgments, and several event topics can reference the same message;
//! without this gate the same note would be posted more than once.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug)]
pub struct DuplicateSuppressor {
    window: Duration,
    seen: HashMap<String, DateTime<Utc>>,
}

impl DuplicateSuppressor {
    pub fn new(window_secs: i64) -> Self {
        Self {
            window: Duration::seconds(window_secs.max(1)),
            seen: HashMap::new(),
        }
    }

    /// Returns true if this `(conversation, text)` pair has not been seen
    /// within the suppression window, and records it as seen at `now`.
    pub fn should_process_at(
        &mut self,
        conversation_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> bool {
        self.evict_expired(now);

        let key = fingerprint(conversation_id, text);
        if self.seen.contains_key(&key) {
            return false;
        }
        self.seen.insert(key, now + self.window);
        true
    }

    pub fn should_process(&mut self, conversation_id: &str, text: &str) -> bool {
        self.should_process_at(conversation_id, text, Utc::now())
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) {
        self.seen.retain(|_, expires_at| *expires_at > now);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Short stable content hash; never logs or stores the raw text.
fn fingerprint(conversation_id: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(conversation_id.as_bytes());
    hasher.update(b"\x00");
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn repeat_within_window_is_suppressed() {
        let mut d = DuplicateSuppressor::new(60);
        let now = t0();
        assert!(d.should_process_at("conv-1", "hello there", now));
        assert!(!d.should_process_at("conv-1", "hello there", now + Duration::seconds(1)));
    }

    #[test]
    fn different_conversation_or_text_passes() {
        let mut d = DuplicateSuppressor::new(60);
        let now = t0();
        assert!(d.should_process_at("conv-1", "hello there", now));
        assert!(d.should_process_at("conv-2", "hello there", now));
        assert!(d.should_process_at("conv-1", "different text", now));
    }

    #[test]
    fn expires_after_window() {
        let mut d = DuplicateSuppressor::new(10);
        let now = t0();
        assert!(d.should_process_at("conv-1", "hello there", now));
        assert!(d.should_process_at("conv-1", "hello there", now + Duration::seconds(11)));
    }

    #[test]
    fn eviction_bounds_memory() {
        let mut d = DuplicateSuppressor::new(10);
        let now = t0();
        for i in 0..100 {
            d.should_process_at("conv", &format!("msg {i}"), now);
        }
        d.should_process_at("conv", "late", now + Duration::seconds(11));
        assert_eq!(d.len(), 1);
    }
}
