// src/pipeline.rs
//! Event sequencing: topic filter, extraction, normalization, content gate,
//! duplicate suppression, classification, translation, publication. Every
//! gate short-circuits silently; the platform only ever sees the 200 that
//! was sent before any of this ran.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde_json::Value;
use std::sync::Mutex;
use tracing::debug;

use crate::config::AppConfig;
use crate::dedupe::DuplicateSuppressor;
use crate::extract::{self, parse_event};
use crate::language;
use crate::normalize::normalize;
use crate::publish::NotePublisher;
use crate::translate::Translator;

pub struct Pipeline {
    enabled: bool,
    min_words: usize,
    prefer_content_detection: bool,
    dedupe: Mutex<DuplicateSuppressor>,
    translator: Translator,
    publisher: NotePublisher,
}

impl Pipeline {
    pub fn new(cfg: &AppConfig, translator: Translator, publisher: NotePublisher) -> Self {
        Self {
            enabled: cfg.enabled,
            min_words: cfg.min_words,
            prefer_content_detection: cfg.prefer_content_detection,
            dedupe: Mutex::new(DuplicateSuppressor::new(cfg.dedupe_window_secs)),
            translator,
            publisher,
        }
    }

    pub async fn handle(&self, payload: Value) {
        self.handle_at(payload, Utc::now()).await
    }

    pub async fn handle_at(&self, payload: Value, now: DateTime<Utc>) {
        counter!("webhook_events_total").increment(1);

        if !self.enabled {
            debug!("translator disabled, event discarded");
            return;
        }

        let ev = parse_event(&payload);
        if !extract::topic_allowed(&ev.topic) {
            debug!(topic = %ev.topic, "unsupported topic");
            counter!("events_discarded_total").increment(1);
            return;
        }
        let Some(conversation_id) = ev.conversation_id else {
            debug!("event without conversation id");
            counter!("events_discarded_total").increment(1);
            return;
        };

        let text = normalize(ev.raw_body.as_deref());
        if text.is_empty() {
            counter!("events_discarded_total").increment(1);
            return;
        }

        // Very short acknowledgements ("ok", "thanks") are never translated.
        if text.split_whitespace().count() < self.min_words {
            debug!(conversation = %conversation_id, "below word-count threshold");
            counter!("events_discarded_total").increment(1);
            return;
        }

        let fresh = self
            .dedupe
            .lock()
            .expect("dedupe mutex poisoned")
            .should_process_at(&conversation_id, &text, now);
        if !fresh {
            debug!(conversation = %conversation_id, "duplicate event suppressed");
            counter!("dedup_suppressed_total").increment(1);
            return;
        }

        let lang = language::classify(
            &text,
            ev.language_hint.as_deref(),
            self.prefer_content_detection,
        );

        let Some(result) = self.translator.translate_at(&text, &lang, now).await else {
            return;
        };

        self.publisher.publish(&conversation_id, &result).await;
    }
}
