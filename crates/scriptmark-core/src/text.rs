//! Text normalization and tokenization shared by all scorers.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Common English stop words excluded from keyword extraction and concept
/// sets.
static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn stop_words() -> &'static HashSet<&'static str> {
    STOP_WORDS.get_or_init(|| {
        [
            "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
            "by", "from", "as", "is", "was", "are", "were", "be", "been", "being", "have", "has",
            "had", "do", "does", "did", "will", "would", "should", "could", "may", "might", "can",
            "this", "that", "these", "those", "it", "its", "they", "them", "their",
        ]
        .iter()
        .copied()
        .collect()
    })
}

/// Returns `true` if `word` is in the stop-word set.
pub fn is_stop_word(word: &str) -> bool {
    stop_words().contains(word)
}

/// Lower-case and trim surrounding whitespace.
///
/// Total over any input; the empty string normalizes to the empty string.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lower-cased alphanumeric tokens, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Alphabetic tokens of length >= 3 with stop words removed, lower-cased,
/// in order of appearance. This is the token stream keyword extraction and
/// concept sets are built from.
pub fn content_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|s| s.len() >= 3)
        .filter(|s| !is_stop_word(s))
        .map(|s| s.to_string())
        .collect()
}
