// src/translate/providers.rs
//! Translation backends behind one normalized interface. Each adapter turns
//! its service's wire shape into a `ProviderReply` and classifies failures
//! so the orchestrator can tell a rate limit from a hard error.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub text: String,
    /// Provider-reported detection, preferred over an "auto" hint.
    pub detected_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    RateLimited,
    Timeout,
    Http(String),
    Malformed(String),
    Unsupported(&'static str),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::RateLimited => write!(f, "rate limited"),
            ProviderError::Timeout => write!(f, "timed out"),
            ProviderError::Http(e) => write!(f, "http error: {e}"),
            ProviderError::Malformed(e) => write!(f, "malformed response: {e}"),
            ProviderError::Unsupported(why) => write!(f, "unsupported request: {why}"),
        }
    }
}

impl ProviderError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(e.to_string())
        }
    }
}

#[async_trait]
pub trait TranslateProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// One bounded-timeout request; `source` may be `"auto"`.
    async fn attempt(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<ProviderReply, ProviderError>;
}

#[async_trait]
impl<T: TranslateProvider + ?Sized> TranslateProvider for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn attempt(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<ProviderReply, ProviderError> {
        (**self).attempt(text, source, target).await
    }
}

fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("intercom-auto-translator/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("reqwest client")
}

// ------------------------------------------------------------
// Google web endpoint (the `client=gtx` endpoint the original
// deployment used; no API key, aggressive rate limits)
// ------------------------------------------------------------

pub struct GoogleWebProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleWebProvider {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
        }
    }
}

#[async_trait]
impl TranslateProvider for GoogleWebProvider {
    fn name(&self) -> &'static str {
        "google-web"
    }

    async fn attempt(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<ProviderReply, ProviderError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(ProviderError::Http(format!("status {}", resp.status())));
        }

        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        // Positional array response: segments at [0][i][0], detected
        // source language at [2].
        let segments = value
            .get(0)
            .and_then(|v| v.as_array())
            .ok_or_else(|| ProviderError::Malformed("missing segment array".to_string()))?;

        let mut translated = String::new();
        for segment in segments {
            if let Some(piece) = segment.get(0).and_then(|v| v.as_str()) {
                translated.push_str(piece);
            }
        }
        if translated.is_empty() {
            return Err(ProviderError::Malformed("empty segments".to_string()));
        }

        let detected = value
            .get(2)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(ProviderReply {
            text: translated,
            detected_source: detected,
        })
    }
}

// ------------------------------------------------------------
// LibreTranslate
// ------------------------------------------------------------

#[derive(Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
    #[serde(rename = "detectedLanguage")]
    detected_language: Option<LibreDetected>,
}

#[derive(Deserialize)]
struct LibreDetected {
    language: String,
}

pub struct LibreTranslateProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl LibreTranslateProvider {
    pub fn new(url: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            url: url.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl TranslateProvider for LibreTranslateProvider {
    fn name(&self) -> &'static str {
        "libretranslate"
    }

    async fn attempt(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<ProviderReply, ProviderError> {
        let req = LibreRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(ProviderError::Http(format!("status {}", resp.status())));
        }

        let body: LibreResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(ProviderReply {
            text: body.translated_text,
            detected_source: body.detected_language.map(|d| d.language),
        })
    }
}

// ------------------------------------------------------------
// MyMemory
// ------------------------------------------------------------

#[derive(Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: MyMemoryData,
    #[serde(rename = "responseStatus", default)]
    response_status: serde_json::Value,
}

#[derive(Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

pub struct MyMemoryProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl MyMemoryProvider {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            endpoint: "https://api.mymemory.translated.net/get".to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl TranslateProvider for MyMemoryProvider {
    fn name(&self) -> &'static str {
        "mymemory"
    }

    async fn attempt(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<ProviderReply, ProviderError> {
        // MyMemory has no autodetection; the chain only routes concrete
        // source languages here.
        if source == crate::language::AUTO {
            return Err(ProviderError::Unsupported("auto source"));
        }

        let langpair = format!("{source}|{target}");
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", &langpair)])
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(ProviderError::Http(format!("status {}", resp.status())));
        }

        let body: MyMemoryResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        // The service reports quota exhaustion as status 429 in the JSON
        // body while the HTTP status stays 200.
        if body.response_status.as_i64() == Some(429)
            || body.response_status.as_str() == Some("429")
        {
            return Err(ProviderError::RateLimited);
        }

        let translated = body.response_data.translated_text.unwrap_or_default();
        if translated.is_empty() {
            return Err(ProviderError::Malformed("empty translatedText".to_string()));
        }

        Ok(ProviderReply {
            text: translated,
            detected_source: None,
        })
    }
}

// ------------------------------------------------------------
// Scripted provider for tests
// ------------------------------------------------------------

/// Deterministic provider that pops pre-queued outcomes and counts calls.
pub struct ScriptedProvider {
    name: &'static str,
    script: std::sync::Mutex<std::collections::VecDeque<Result<ProviderReply, ProviderError>>>,
    calls: std::sync::atomic::AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(
        name: &'static str,
        outcomes: Vec<Result<ProviderReply, ProviderError>>,
    ) -> Self {
        Self {
            name,
            script: std::sync::Mutex::new(outcomes.into()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn ok(text: &str) -> Result<ProviderReply, ProviderError> {
        Ok(ProviderReply {
            text: text.to_string(),
            detected_source: None,
        })
    }

    pub fn ok_detected(text: &str, lang: &str) -> Result<ProviderReply, ProviderError> {
        Ok(ProviderReply {
            text: text.to_string(),
            detected_source: Some(lang.to_string()),
        })
    }
}

#[async_trait]
impl TranslateProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attempt(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<ProviderReply, ProviderError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut script = self.script.lock().expect("script mutex poisoned");
        match script.pop_front() {
            Some(outcome) => outcome,
            None => Err(ProviderError::Http("script exhausted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mymemory_refuses_auto_source_without_a_request() {
        // Unroutable endpoint: if the adapter tried to build a langpair from
        // "auto" and sent the request anyway, the error would be Http/Timeout
        // rather than the gate's Unsupported.
        let p = MyMemoryProvider::new(1).with_endpoint("http://127.0.0.1:9/get");
        let err = p
            .attempt("guten morgen", "auto", "en")
            .await
            .expect_err("auto source must be refused");
        assert_eq!(err, ProviderError::Unsupported("auto source"));
    }

    #[tokio::test]
    async fn mymemory_accepts_concrete_source_pairs_only_at_the_gate() {
        // A concrete pair passes the gate and proceeds to the request, which
        // fails against the unroutable endpoint.
        let p = MyMemoryProvider::new(1).with_endpoint("http://127.0.0.1:9/get");
        let err = p
            .attempt("guten morgen", "de", "en")
            .await
            .expect_err("unroutable endpoint must fail");
        assert!(!matches!(err, ProviderError::Unsupported(_)), "got {err}");
    }
}
