// src/normalize.rs
//! Raw message cleanup: Intercom delivers conversation bodies as HTML
//! fragments. This module reduces them to plain text and throws away
//! fragments that are UI debris rather than customer content.

use once_cell::sync::Lazy;
use regex::Regex;

/// Cleaned text at or below this length is eligible for the garbage gate.
const GARBAGE_LEN_MAX: usize = 60;

/// UI vocabulary that shows up when a widget snippet leaks into the body.
const UI_NOISE_WORDS: &[&str] = &["menu", "dropdown", "select", "option"];

static RE_LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</div>|</li>").expect("line-break regex"));
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_URLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bhttps?://[^\s<>"]+|\bwww\.[^\s<>"]+"#).expect("url regex"));
static RE_INLINE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").expect("ws regex"));
static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank regex"));
static RE_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\w+\s*=\s*"[^"]*""#).expect("attribute regex"));

/// Normalize a raw (possibly HTML) message body to plain text.
///
/// Returns `""` for absent input and for cleaned text that still looks like
/// UI debris; an empty result means "nothing to translate".
pub fn normalize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(raw).to_string();

    // 2) Line-break markup becomes real newlines, everything else is dropped
    out = RE_LINE_BREAKS.replace_all(&out, "\n").to_string();
    out = RE_TAGS.replace_all(&out, "").to_string();

    // 3) Strip URLs
    out = RE_URLS.replace_all(&out, "").to_string();

    // 4) Collapse whitespace runs but keep explicit newlines
    out = RE_INLINE_WS.replace_all(&out, " ").to_string();
    out = RE_BLANK_LINES.replace_all(&out, "\n\n").to_string();
    out = out
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    if is_ui_garbage(&out) {
        return String::new();
    }

    out
}

/// Short fragments that still carry attribute syntax or widget vocabulary
/// after cleaning are treated as noise, not content.
fn is_ui_garbage(cleaned: &str) -> bool {
    if cleaned.is_empty() || cleaned.chars().count() > GARBAGE_LEN_MAX {
        return false;
    }
    if RE_ATTRIBUTE.is_match(cleaned) {
        return true;
    }
    let lower = cleaned.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| UI_NOISE_WORDS.contains(&w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_input_yields_empty() {
        assert_eq!(normalize(None), "");
    }

    #[test]
    fn strips_tags_and_entities() {
        let raw = "<p>Bonjour, j&#39;ai un probl&egrave;me avec ma commande</p>";
        assert_eq!(normalize(Some(raw)), "Bonjour, j'ai un problème avec ma commande");
    }

    #[test]
    fn br_becomes_newline_and_ws_collapses() {
        let raw = "Hello   world<br>next   line";
        assert_eq!(normalize(Some(raw)), "Hello world\nnext line");
    }

    #[test]
    fn urls_are_removed() {
        let raw = "see https://example.com/page?a=1 please";
        assert_eq!(normalize(Some(raw)), "see please");
    }

    #[test]
    fn attribute_fragments_are_garbage() {
        assert_eq!(normalize(Some(r#"class="btn primary""#)), "");
    }

    #[test]
    fn short_ui_vocabulary_is_garbage() {
        assert_eq!(normalize(Some("dropdown menu option")), "");
    }

    #[test]
    fn long_text_mentioning_menu_is_kept() {
        let raw = "I clicked the menu in your app and then the whole page froze, \
                   I cannot reach my order history anymore.";
        assert!(!normalize(Some(raw)).is_empty());
    }
}
