// src/extract.rs
//! Intercom payload adapter. Conversation bodies show up in several places
//! depending on event kind and API version, so extraction walks a fixed list
//! of candidate paths rather than assuming one shape.

use serde_json::Value;

/// Event topics this relay reacts to; everything else is a no-op.
pub const ALLOWED_TOPICS: &[&str] = &["conversation.user.created", "conversation.user.replied"];

#[derive(Debug, Clone, Default)]
pub struct InboundEvent {
    pub topic: String,
    pub conversation_id: Option<String>,
    pub raw_body: Option<String>,
    pub language_hint: Option<String>,
}

pub fn topic_allowed(topic: &str) -> bool {
    ALLOWED_TOPICS.contains(&topic)
}

/// Pull the fields we consume out of an opaque webhook payload. Anything
/// missing stays `None`; the pipeline treats that as "nothing to do".
pub fn parse_event(payload: &Value) -> InboundEvent {
    let topic = payload
        .get("topic")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let item = payload.pointer("/data/item").cloned().unwrap_or(Value::Null);

    let conversation_id = match item.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let raw_body = first_string(
        &item,
        &[
            "/body",
            "/source/body",
            "/conversation_parts/conversation_parts/0/body",
            "/conversation_parts/0/body",
            "/part/body",
            "/conversation_message/body",
        ],
    );

    let language_hint = first_string(&item, &["/custom_attributes/language", "/language_override"]);

    InboundEvent {
        topic,
        conversation_id,
        raw_body,
        language_hint,
    }
}

fn first_string(item: &Value, pointers: &[&str]) -> Option<String> {
    pointers.iter().find_map(|p| {
        item.pointer(p)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
    })
}
