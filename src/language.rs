// src/language.rs
//! Source-language classification: platform hints first, local statistical
//! detection (whatlang) as the fallback. Everything resolves to a canonical
//! 2-letter code or `"auto"` ("unknown, let the provider decide").

use once_cell::sync::Lazy;
use std::collections::HashMap;
use whatlang::Lang;

/// Canonical "unknown" marker.
pub const AUTO: &str = "auto";

/// Trigram detection is unreliable on very short inputs; below this many
/// chars we report `auto` instead of guessing.
pub const MIN_DETECT_CHARS: usize = 16;

/// Known language labels (names, ISO codes, regional variants) mapped to
/// canonical 2-letter codes. Lookup is case-insensitive.
static HINT_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let entries: &[(&str, &str)] = &[
        ("english", "en"),
        ("en", "en"),
        ("en-us", "en"),
        ("en-gb", "en"),
        ("russian", "ru"),
        ("ru", "ru"),
        ("french", "fr"),
        ("fr", "fr"),
        ("german", "de"),
        ("de", "de"),
        ("spanish", "es"),
        ("es", "es"),
        ("es-mx", "es"),
        ("portuguese", "pt"),
        ("pt", "pt"),
        ("pt-br", "pt"),
        ("portuguese (brazil)", "pt"),
        ("italian", "it"),
        ("it", "it"),
        ("dutch", "nl"),
        ("nl", "nl"),
        ("polish", "pl"),
        ("pl", "pl"),
        ("czech", "cs"),
        ("cs", "cs"),
        ("ukrainian", "uk"),
        ("uk", "uk"),
        ("turkish", "tr"),
        ("tr", "tr"),
        ("arabic", "ar"),
        ("ar", "ar"),
        ("hebrew", "he"),
        ("he", "he"),
        ("hindi", "hi"),
        ("hi", "hi"),
        ("japanese", "ja"),
        ("ja", "ja"),
        ("korean", "ko"),
        ("ko", "ko"),
        ("chinese", "zh"),
        ("zh", "zh"),
        ("zh-cn", "zh"),
        ("zh-hans", "zh"),
        ("zh-tw", "zh"),
        ("zh-hant", "zh"),
        ("chinese (simplified)", "zh"),
        ("chinese (traditional)", "zh"),
        ("vietnamese", "vi"),
        ("vi", "vi"),
        ("thai", "th"),
        ("th", "th"),
        ("indonesian", "id"),
        ("id", "id"),
        ("swedish", "sv"),
        ("sv", "sv"),
        ("danish", "da"),
        ("da", "da"),
        ("norwegian", "nb"),
        ("nb", "nb"),
        ("no", "nb"),
        ("finnish", "fi"),
        ("fi", "fi"),
        ("greek", "el"),
        ("el", "el"),
        ("romanian", "ro"),
        ("ro", "ro"),
        ("hungarian", "hu"),
        ("hu", "hu"),
        ("bulgarian", "bg"),
        ("bg", "bg"),
        ("croatian", "hr"),
        ("hr", "hr"),
        ("slovak", "sk"),
        ("sk", "sk"),
    ];
    entries.iter().copied().collect()
});

/// Map a free-form platform label to a canonical code, if known.
pub fn map_hint(hint: &str) -> Option<&'static str> {
    let key = hint.trim().to_lowercase();
    if key.is_empty() || key == AUTO {
        return None;
    }
    HINT_MAP.get(key.as_str()).copied()
}

/// Statistical detection over the text itself. Returns `None` when the text
/// is too short or whatlang cannot produce a mapped code.
pub fn detect_code(text: &str) -> Option<&'static str> {
    if text.chars().count() < MIN_DETECT_CHARS {
        return None;
    }
    let info = whatlang::detect(text)?;
    lang_to_code(info.lang())
}

/// Resolve the best-guess source language for a message.
///
/// A mapped, non-auto platform hint wins over detection unless
/// `prefer_content` is set; undetermined always maps to [`AUTO`].
pub fn classify(text: &str, hint: Option<&str>, prefer_content: bool) -> String {
    let mapped_hint = hint.and_then(map_hint);

    let code = if prefer_content {
        detect_code(text).or(mapped_hint)
    } else {
        mapped_hint.or_else(|| detect_code(text))
    };

    code.unwrap_or(AUTO).to_string()
}

/// whatlang uses ISO 639-3; translation providers speak ISO 639-1.
fn lang_to_code(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Rus => "ru",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Pol => "pl",
        Lang::Ces => "cs",
        Lang::Ukr => "uk",
        Lang::Tur => "tr",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh", // whatlang reports Mandarin as Cmn
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Ind => "id",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Nob => "nb",
        Lang::Fin => "fi",
        Lang::Ell => "el",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        Lang::Bul => "bg",
        Lang::Hrv => "hr",
        Lang::Slk => "sk",
        _ => return None,
    };
    Some(code)
}
