//! Keyword normalization and extraction.
//!
//! Explicit keywords on a question are always normalized but never
//! overridden. When a question carries no keywords, a set is derived from
//! the model answer: the lexical strategy ranks tokens by frequency, the
//! semantic strategy approximates entity/lemma extraction with the stemmer
//! resource.

use std::collections::HashMap;

use crate::similarity::SimilarityModel;
use crate::text;

/// Default keyword cap for the frequency strategy.
pub const DEFAULT_FREQUENCY_CAP: usize = 10;
/// Default keyword cap for the linguistic strategy.
pub const DEFAULT_LINGUISTIC_CAP: usize = 8;

/// Trim, lower-case, and drop empty entries, preserving order.
///
/// Idempotent: normalizing an already-normalized set returns the same set.
pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| text::normalize(k))
        .filter(|k| !k.is_empty())
        .collect()
}

/// Top `cap` tokens of the model answer by descending frequency.
///
/// Tokens are alphabetic, length >= 3, stop-word filtered. Ties are broken
/// by first occurrence order.
pub fn extract_frequency(expected_answer: &str, cap: usize) -> Vec<String> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    for word in text::content_words(expected_answer) {
        let entry = counts.entry(word.clone()).or_insert(0);
        if *entry == 0 {
            first_seen.push(word);
        }
        *entry += 1;
    }

    let mut ranked: Vec<String> = first_seen;
    // Stable sort keeps first-occurrence order among equal counts.
    ranked.sort_by(|a, b| counts[b].cmp(&counts[a]));

    ranked.truncate(cap);
    ranked
}

/// Entity and lemma extraction for the semantic strategy.
///
/// Capitalized spans that do not open a sentence are taken as named
/// entities; content words supply the rest. The result is deduplicated by
/// stem preserving first occurrence and capped at `cap`.
pub fn extract_linguistic(expected_answer: &str, cap: usize, model: &SimilarityModel) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let mut seen_stems: Vec<String> = Vec::new();

    for entity in capitalized_spans(expected_answer) {
        push_unique(entity, model, &mut keywords, &mut seen_stems);
    }

    for word in text::content_words(expected_answer) {
        push_unique(word, model, &mut keywords, &mut seen_stems);
    }

    keywords.truncate(cap);
    keywords
}

fn push_unique(
    candidate: String,
    model: &SimilarityModel,
    keywords: &mut Vec<String>,
    seen_stems: &mut Vec<String>,
) {
    let stem = candidate
        .split_whitespace()
        .map(|w| model.stem(w))
        .collect::<Vec<_>>()
        .join(" ");
    if !seen_stems.contains(&stem) {
        seen_stems.push(stem);
        keywords.push(candidate);
    }
}

/// Maximal runs of capitalized words that do not start a sentence,
/// lower-cased. A run at the very beginning of the text or right after
/// sentence punctuation is skipped when it is a single word, since that is
/// ordinary sentence capitalization rather than a name.
fn capitalized_spans(text: &str) -> Vec<String> {
    let mut spans = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut sentence_start = true;
    let mut run_opens_sentence = false;

    let mut flush = |current: &mut Vec<String>, run_opens_sentence: bool, spans: &mut Vec<String>| {
        if current.len() >= 2 || (current.len() == 1 && !run_opens_sentence) {
            spans.push(current.join(" ").to_lowercase());
        }
        current.clear();
    };

    for raw in text.split_whitespace() {
        let word: String = raw.chars().filter(|c| c.is_alphabetic()).collect();
        let capitalized = word.chars().next().is_some_and(|c| c.is_uppercase())
            && word.len() >= 3
            && !text::is_stop_word(&word.to_lowercase());

        if capitalized {
            if current.is_empty() {
                run_opens_sentence = sentence_start;
            }
            current.push(word);
        } else {
            flush(&mut current, run_opens_sentence, &mut spans);
        }

        sentence_start = raw.ends_with(['.', '!', '?', ':']);
    }
    flush(&mut current, run_opens_sentence, &mut spans);

    spans
}
