// src/publish.rs
//! Posting translations back to the conversation as internal notes.
//! Publishing is best-effort: the webhook was acknowledged long before this
//! runs, so failures are logged and swallowed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::translate::TranslationResult;

#[async_trait]
pub trait NoteSink: Send + Sync {
    async fn post_note(&self, conversation_id: &str, body: &str) -> Result<()>;
}

/// Intercom reply endpoint: `POST /conversations/{id}/reply` with a
/// bearer token and `message_type: "note"`.
pub struct IntercomSink {
    client: Client,
    api_base: String,
    token: String,
    admin_id: String,
}

impl IntercomSink {
    pub fn new(api_base: &str, token: &str, admin_id: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("reqwest client"),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            admin_id: admin_id.to_string(),
        }
    }
}

#[async_trait]
impl NoteSink for IntercomSink {
    async fn post_note(&self, conversation_id: &str, body: &str) -> Result<()> {
        let url = format!("{}/conversations/{}/reply", self.api_base, conversation_id);
        let payload = serde_json::json!({
            "message_type": "note",
            "type": "admin",
            "admin_id": self.admin_id,
            "body": body,
        });

        self.client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .context("note post")?
            .error_for_status()
            .context("note post non-2xx")?;
        Ok(())
    }
}

pub struct NotePublisher {
    sink: Arc<dyn NoteSink>,
}

impl NotePublisher {
    pub fn new(sink: Arc<dyn NoteSink>) -> Self {
        Self { sink }
    }

    /// Format and post the note; never propagates failure.
    pub async fn publish(&self, conversation_id: &str, result: &TranslationResult) {
        let body = format_note(result);
        match self.sink.post_note(conversation_id, &body).await {
            Ok(()) => {
                info!(conversation = conversation_id, "translation note posted");
                counter!("notes_posted_total").increment(1);
            }
            Err(e) => {
                warn!(conversation = conversation_id, error = %e, "note post failed");
                counter!("note_errors_total").increment(1);
            }
        }
    }
}

/// Note body carries both language tags and the translated text verbatim.
pub fn format_note(result: &TranslationResult) -> String {
    format!(
        "Translation [{} -> {}]:\n{}",
        result.source_lang, result.target_lang, result.text
    )
}
