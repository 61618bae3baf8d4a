//! Description text preprocessing.
//!
//! Cleaned text is the contract of the resolver: the same raw description
//! must always clean to the same string, because that string is the cache
//! key for venue resolution.

use once_cell::sync::Lazy;
use regex::Regex;

/// Values that mean "no venue decided yet" wherever a venue is expected.
const PLACEHOLDER_TOKENS: &[&str] =
    &["TBD", "TBA", "To be determined", "Unknown", "Pending", "N/A"];

/// Word split across a line break, with optional surrounding spaces.
static BROKEN_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w)\s*\n\s*(\w)").expect("valid broken-line regex"));

/// Unescapes the RFC 5545 text sequences: `\n` and `\N` become a newline,
/// `\,` a comma, `\;` a semicolon, and `\\` a backslash. Unrecognized
/// escapes are kept verbatim.
pub fn unescape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Rejoins words that a hard line wrap split in half. Only joins when word
/// characters sit on both sides of the break, so paragraph punctuation
/// keeps its line ending.
pub fn join_broken_lines(text: &str) -> String {
    BROKEN_LINE_RE.replace_all(text, "$1$2").into_owned()
}

/// Canonical cleaning pipeline for description text: trim, rejoin broken
/// words, then unescape. The order is fixed; unescaping first would let
/// escaped newlines trigger word joins.
pub fn clean_description(raw: &str) -> String {
    unescape_text(&join_broken_lines(raw.trim()))
}

/// Whether `value` is one of the placeholder tokens, ignoring case and
/// surrounding whitespace.
pub fn is_placeholder_token(value: &str) -> bool {
    let trimmed = value.trim();
    PLACEHOLDER_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}
