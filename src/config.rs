// src/config.rs
//! Environment-driven configuration, resolved once at startup. Missing
//! platform credentials are the only fatal error class; everything else has
//! a default.

use anyhow::{bail, Result};
use std::env;

pub const ENV_INTERCOM_TOKEN: &str = "INTERCOM_TOKEN";
pub const ENV_INTERCOM_ADMIN_ID: &str = "INTERCOM_ADMIN_ID";
pub const ENV_INTERCOM_API_BASE: &str = "INTERCOM_API_BASE";
pub const ENV_TRANSLATOR_ENABLED: &str = "TRANSLATOR_ENABLED";
pub const ENV_TARGET_LANG: &str = "TARGET_LANG";
pub const ENV_SKIP_LANGS: &str = "SKIP_LANGS";
pub const ENV_MIN_WORDS: &str = "MIN_WORDS";
pub const ENV_DEDUPE_WINDOW_SECS: &str = "DEDUPE_WINDOW_SECS";
pub const ENV_CACHE_TTL_SECS: &str = "CACHE_TTL_SECS";
pub const ENV_PREFER_CONTENT_DETECTION: &str = "PREFER_CONTENT_DETECTION";
pub const ENV_LIBRETRANSLATE_URL: &str = "LIBRETRANSLATE_URL";
pub const ENV_LIBRETRANSLATE_API_KEY: &str = "LIBRETRANSLATE_API_KEY";
pub const ENV_PROVIDER_TIMEOUT_SECS: &str = "PROVIDER_TIMEOUT_SECS";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_TARGET_LANG: &str = "en";
pub const DEFAULT_SKIP_LANGS: &str = "en,ru";
pub const DEFAULT_MIN_WORDS: usize = 3;
pub const DEFAULT_DEDUPE_WINDOW_SECS: i64 = 60;
pub const DEFAULT_CACHE_TTL_SECS: i64 = 600;
pub const DEFAULT_LIBRETRANSLATE_URL: &str = "https://libretranslate.de/translate";
pub const DEFAULT_INTERCOM_API_BASE: &str = "https://api.intercom.io";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub intercom_token: String,
    pub admin_id: String,
    pub intercom_api_base: String,
    /// When false the dispatcher accepts and discards every event.
    pub enabled: bool,
    pub target_lang: String,
    pub skip_langs: Vec<String>,
    pub min_words: usize,
    pub dedupe_window_secs: i64,
    pub cache_ttl_secs: i64,
    pub prefer_content_detection: bool,
    pub libretranslate_url: String,
    pub libretranslate_api_key: Option<String>,
    pub provider_timeout_secs: u64,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let intercom_token = match env::var(ENV_INTERCOM_TOKEN) {
            Ok(t) if !t.trim().is_empty() => t,
            _ => bail!("{ENV_INTERCOM_TOKEN} is required"),
        };
        let admin_id = match env::var(ENV_INTERCOM_ADMIN_ID) {
            Ok(id) if !id.trim().is_empty() => id,
            _ => bail!("{ENV_INTERCOM_ADMIN_ID} is required"),
        };

        Ok(Self {
            intercom_token,
            admin_id,
            intercom_api_base: env_or(ENV_INTERCOM_API_BASE, DEFAULT_INTERCOM_API_BASE),
            enabled: env_flag(ENV_TRANSLATOR_ENABLED, true),
            target_lang: env_or(ENV_TARGET_LANG, DEFAULT_TARGET_LANG).to_lowercase(),
            skip_langs: parse_lang_list(&env_or(ENV_SKIP_LANGS, DEFAULT_SKIP_LANGS)),
            min_words: env_parsed(ENV_MIN_WORDS, DEFAULT_MIN_WORDS),
            dedupe_window_secs: env_parsed(ENV_DEDUPE_WINDOW_SECS, DEFAULT_DEDUPE_WINDOW_SECS),
            cache_ttl_secs: env_parsed(ENV_CACHE_TTL_SECS, DEFAULT_CACHE_TTL_SECS),
            prefer_content_detection: env_flag(ENV_PREFER_CONTENT_DETECTION, false),
            libretranslate_url: env_or(ENV_LIBRETRANSLATE_URL, DEFAULT_LIBRETRANSLATE_URL),
            libretranslate_api_key: env::var(ENV_LIBRETRANSLATE_API_KEY)
                .ok()
                .filter(|k| !k.trim().is_empty()),
            provider_timeout_secs: env_parsed(
                ENV_PROVIDER_TIMEOUT_SECS,
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            ),
            port: env_parsed(ENV_PORT, DEFAULT_PORT),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => matches!(v.trim(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_lang_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
