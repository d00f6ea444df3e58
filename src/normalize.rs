//! Candidate name cleaning ahead of classification.
//!
//! Steps run in a fixed order; the suffix step sees words only after the
//! punctuation step has removed dots and commas, so "Inc." and "inc," both
//! match.

use std::sync::LazyLock;

use regex::Regex;

/// Removed outright. "â„¢" is how "™" reads after a latin-1 mis-decode.
const PUNCTUATION: &[char] = &['.', ',', '-', '&', '\'', '’', '+', '™', '®'];
const MOJIBAKE_TM: &str = "â„¢";

/// Corporate-entity words dropped when they end a multi-word name.
const SUFFIXES: &[&str] = &["inc", "ltd", "pvt", "gmbh", "llc", "ag", "co", "limited"];

static PARENTHETICAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*\)").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let no_punct = lowered.replace(MOJIBAKE_TM, "").replace(PUNCTUATION, "");
    let no_suffix = strip_suffixes(&no_punct);
    let no_parens = PARENTHETICAL_RE.replace_all(&no_suffix, "");
    let before_at = no_parens.split('@').next().unwrap_or("");
    WHITESPACE_RE.replace_all(before_at.trim(), "_").into_owned()
}

/// Drop trailing suffix words, keeping at least one word.
fn strip_suffixes(name: &str) -> String {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    while words.len() > 1 && words.last().is_some_and(|w| SUFFIXES.contains(w)) {
        words.pop();
    }
    words.join(" ")
}
