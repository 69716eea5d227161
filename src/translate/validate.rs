// src/translate/validate.rs
//! Acceptance rules for provider output. Free translation backends have been
//! observed returning the literal input, leaked error boilerplate, repeated
//! tokens, and runaway expansions; all of those count as failures so the
//! chain can advance to the next provider.

use std::fmt;

/// Candidate output that echoes the source with similarity at or above this
/// is rejected even when not byte-identical (transliteration, punctuation
/// tweaks).
const ECHO_SIMILARITY: f64 = 0.92;

/// Candidate longer than `source_chars * EXPANSION_FACTOR` (with a small
/// floor for short inputs) is treated as spam.
const EXPANSION_FACTOR: usize = 3;
const EXPANSION_FLOOR: usize = 48;

/// Minimum token count before the repetition rule applies.
const REPETITION_MIN_TOKENS: usize = 6;
/// Distinct/total token ratio below this marks repeated-token spam.
const REPETITION_MIN_RATIO: f64 = 0.34;

/// Error strings some backends leak into the translated-text field.
const GARBAGE_SIGNATURES: &[&str] = &[
    "mymemory warning",
    "query length limit",
    "usage limit reached",
    "invalid language pair",
    "please select two distinct languages",
    "translated.net",
    "please try again later",
    "error 429",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    Echo,
    KnownGarbage,
    RepeatedTokens,
    LengthBlowup,
    NearSource,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::Empty => "empty",
            Rejection::Echo => "echo of input",
            Rejection::KnownGarbage => "known garbage signature",
            Rejection::RepeatedTokens => "repeated-token spam",
            Rejection::LengthBlowup => "disproportionate length",
            Rejection::NearSource => "too similar to source",
        };
        f.write_str(s)
    }
}

/// One policy object holding every named rule, so each is testable on its
/// own and the orchestrator applies them uniformly.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    echo_similarity: f64,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self {
            echo_similarity: ECHO_SIMILARITY,
        }
    }
}

impl ResponseValidator {
    pub fn check(&self, source: &str, candidate: &str) -> Result<(), Rejection> {
        let cand = candidate.trim();
        if cand.is_empty() {
            return Err(Rejection::Empty);
        }

        let src_folded = fold(source);
        let cand_folded = fold(cand);
        if src_folded == cand_folded {
            return Err(Rejection::Echo);
        }

        let cand_lower = cand.to_lowercase();
        if GARBAGE_SIGNATURES.iter().any(|sig| cand_lower.contains(sig)) {
            return Err(Rejection::KnownGarbage);
        }

        if is_repetition_spam(&cand_folded) {
            return Err(Rejection::RepeatedTokens);
        }

        let src_chars = source.chars().count();
        let cand_chars = cand.chars().count();
        if cand_chars > (src_chars * EXPANSION_FACTOR).max(EXPANSION_FLOOR) {
            return Err(Rejection::LengthBlowup);
        }

        if strsim::normalized_levenshtein(&src_folded, &cand_folded) >= self.echo_similarity {
            return Err(Rejection::NearSource);
        }

        Ok(())
    }
}

/// Case and whitespace folding used by the echo/similarity rules.
fn fold(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_repetition_spam(folded: &str) -> bool {
    let tokens: Vec<&str> = folded.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.len() < REPETITION_MIN_TOKENS {
        return false;
    }
    let distinct: std::collections::HashSet<&str> = tokens.iter().copied().collect();
    (distinct.len() as f64 / tokens.len() as f64) < REPETITION_MIN_RATIO
}
