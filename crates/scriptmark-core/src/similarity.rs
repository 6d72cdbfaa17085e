//! The shared language resource behind the semantic scoring strategy.
//!
//! A [`SimilarityModel`] bundles a Porter stemmer, the stop-word set, and
//! deterministic vector constructions: stem term-frequency vectors for
//! whole-document similarity and character-trigram vectors for word-level
//! similarity. It is built once at startup, holds no mutable state, and is
//! shared across submissions behind an `Arc`.
//!
//! Vectors use `BTreeMap` so that accumulation order, and therefore every
//! floating-point sum, is identical across runs. Grading must be
//! bit-reproducible.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rust_stemmers::{Algorithm, Stemmer};

use crate::text;

/// A sparse term vector.
pub type TermVector = BTreeMap<String, f64>;

/// Process-lifetime language resource: stemmer plus optional extra
/// domain stop words loaded from a lexicon file.
pub struct SimilarityModel {
    stemmer: Stemmer,
    extra_stop_words: HashSet<String>,
}

impl SimilarityModel {
    /// Build the default English model.
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            extra_stop_words: HashSet::new(),
        }
    }

    /// Build the model with an extra stop-word lexicon, one word per line.
    /// Lines starting with `#` are ignored.
    pub fn with_lexicon(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let extra_stop_words = content
            .lines()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        Ok(Self {
            stemmer: Stemmer::create(Algorithm::English),
            extra_stop_words,
        })
    }

    /// Porter stem of a single lower-cased word.
    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(word).to_string()
    }

    fn is_stop(&self, word: &str) -> bool {
        text::is_stop_word(word) || self.extra_stop_words.contains(word)
    }

    /// Stemmed content words of `text`, in order of appearance.
    pub fn stemmed_content_words(&self, input: &str) -> Vec<String> {
        text::content_words(input)
            .iter()
            .filter(|w| !self.is_stop(w))
            .map(|w| self.stem(w))
            .collect()
    }

    /// Stem term-frequency vector over the content words of `text`.
    pub fn term_frequencies(&self, input: &str) -> TermVector {
        let mut freqs = TermVector::new();
        for stem in self.stemmed_content_words(input) {
            *freqs.entry(stem).or_insert(0.0) += 1.0;
        }
        freqs
    }

    /// Cosine similarity between the stem term-frequency vectors of two
    /// texts. Returns 0 when either vector is empty.
    pub fn document_similarity(&self, a: &str, b: &str) -> f64 {
        let vec_a = self.term_frequencies(a);
        let vec_b = self.term_frequencies(b);
        cosine_similarity(&vec_a, &vec_b)
    }

    /// Character-trigram vector of a word (after stemming each
    /// whitespace-separated part).
    pub fn word_vector(&self, word: &str) -> TermVector {
        let stemmed = word
            .split_whitespace()
            .map(|w| self.stem(&w.to_lowercase()))
            .collect::<Vec<_>>()
            .join(" ");
        trigram_vector(&stemmed)
    }

    /// Similarity between two single words: cosine of their trigram
    /// vectors. Identical stems score 1.0.
    pub fn word_similarity(&self, a: &str, b: &str) -> f64 {
        cosine_similarity(&self.word_vector(a), &self.word_vector(b))
    }
}

impl Default for SimilarityModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine similarity between two sparse vectors. Returns 0 when either
/// vector has zero norm.
pub fn cosine_similarity(vec_a: &TermVector, vec_b: &TermVector) -> f64 {
    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (term, weight) in vec_a {
        norm_a += weight * weight;
        if let Some(weight_b) = vec_b.get(term) {
            dot_product += weight * weight_b;
        }
    }

    for weight in vec_b.values() {
        norm_b += weight * weight;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a.sqrt() * norm_b.sqrt())
}

/// Count character trigrams of `word`, padded with a boundary marker so
/// prefixes and suffixes are distinguishable.
fn trigram_vector(word: &str) -> TermVector {
    let mut vector = TermVector::new();
    if word.is_empty() {
        return vector;
    }

    let padded: Vec<char> = std::iter::once('\u{2038}')
        .chain(word.chars())
        .chain(std::iter::once('\u{2038}'))
        .collect();

    for window in padded.windows(3) {
        let gram: String = window.iter().collect();
        *vector.entry(gram).or_insert(0.0) += 1.0;
    }
    vector
}
