//! The scorers behind both grading strategies, and the weighted
//! aggregation that turns sub-scores into marks.
//!
//! Every scorer is a pure function over (text, shared read-only language
//! resource) returning a value in [0, 1]. Degenerate inputs map to the
//! documented neutral defaults rather than errors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::similarity::{cosine_similarity, SimilarityModel, TermVector};
use crate::text;

/// Neutral coverage score when the exact-match variant has no keywords.
pub const NEUTRAL_EXACT_COVERAGE: f64 = 0.5;
/// Neutral coverage score when the semantic variant has no keywords.
pub const NEUTRAL_SEMANTIC_COVERAGE: f64 = 0.7;
/// Neutral density score when the expected answer is empty.
pub const NEUTRAL_DENSITY: f64 = 0.5;
/// Neutral completeness score when the expected concept set is empty.
pub const NEUTRAL_COMPLETENESS: f64 = 0.7;

/// Round to two decimal places, the precision marks are stored at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-answer sub-score breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Keyword coverage score in [0, 1].
    pub coverage: f64,
    /// Length/detail score in [0, 1].
    pub density: f64,
    /// Whole-document similarity in [0, 1]. Semantic strategy only.
    #[serde(default)]
    pub content_similarity: Option<f64>,
    /// Concept overlap score in [0, 1]. Semantic strategy only.
    #[serde(default)]
    pub completeness: Option<f64>,
}

/// How a single keyword fared against the candidate answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    /// Best similarity found for this keyword (1.0 for an exact hit).
    pub similarity: f64,
    pub matched: bool,
}

/// Coverage score plus the per-keyword detail feedback is built from.
#[derive(Debug, Clone)]
pub struct CoverageOutcome {
    pub score: f64,
    pub matches: Vec<KeywordMatch>,
}

impl CoverageOutcome {
    /// Keywords that were not matched, worst similarity first.
    pub fn missing_keywords(&self) -> Vec<&str> {
        let mut missing: Vec<&KeywordMatch> =
            self.matches.iter().filter(|m| !m.matched).collect();
        missing.sort_by(|a, b| {
            a.similarity
                .partial_cmp(&b.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        missing.iter().map(|m| m.keyword.as_str()).collect()
    }
}

/// Exact-match coverage: the fraction of keywords appearing as substrings
/// of the normalized answer. Empty keyword list scores the neutral 0.5.
pub fn exact_coverage(answer_text: &str, keywords: &[String]) -> CoverageOutcome {
    if keywords.is_empty() {
        return CoverageOutcome {
            score: NEUTRAL_EXACT_COVERAGE,
            matches: Vec::new(),
        };
    }

    let normalized = text::normalize(answer_text);
    let matches: Vec<KeywordMatch> = keywords
        .iter()
        .map(|keyword| {
            let matched = normalized.contains(keyword.as_str());
            KeywordMatch {
                keyword: keyword.clone(),
                similarity: if matched { 1.0 } else { 0.0 },
                matched,
            }
        })
        .collect();

    let matched_count = matches.iter().filter(|m| m.matched).count();
    CoverageOutcome {
        score: matched_count as f64 / keywords.len() as f64,
        matches,
    }
}

/// Memoizes keyword trigram vectors for the duration of one grading call,
/// so a keyword repeated across answers is vectorized once.
#[derive(Default)]
pub struct VectorCache {
    vectors: HashMap<String, TermVector>,
}

impl VectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn keyword_vector(&mut self, keyword: &str, model: &SimilarityModel) -> TermVector {
        self.vectors
            .entry(keyword.to_string())
            .or_insert_with(|| model.word_vector(keyword))
            .clone()
    }
}

/// Semantic coverage: a keyword counts as matched when its best trigram
/// cosine against the answer tokens reaches `threshold`, or when a
/// substring / shared-stem fallback hits. The score averages the match
/// rate with the mean similarity of matched keywords (0 when nothing
/// matched). Empty keyword list scores the neutral 0.7.
pub fn semantic_coverage(
    answer_text: &str,
    keywords: &[String],
    model: &SimilarityModel,
    threshold: f64,
    cache: &mut VectorCache,
) -> CoverageOutcome {
    if keywords.is_empty() {
        return CoverageOutcome {
            score: NEUTRAL_SEMANTIC_COVERAGE,
            matches: Vec::new(),
        };
    }

    let normalized = text::normalize(answer_text);
    let tokens = text::tokenize(answer_text);
    let token_vectors: Vec<TermVector> = tokens.iter().map(|t| model.word_vector(t)).collect();

    let matches: Vec<KeywordMatch> = keywords
        .iter()
        .map(|keyword| {
            let keyword_vector = cache.keyword_vector(keyword, model);
            let best = token_vectors
                .iter()
                .map(|tv| cosine_similarity(&keyword_vector, tv))
                .fold(0.0_f64, f64::max);

            let fallback = normalized.contains(keyword.as_str());
            KeywordMatch {
                keyword: keyword.clone(),
                similarity: best,
                matched: best >= threshold || fallback,
            }
        })
        .collect();

    let matched: Vec<&KeywordMatch> = matches.iter().filter(|m| m.matched).collect();
    let match_rate = matched.len() as f64 / keywords.len() as f64;
    let mean_similarity = if matched.is_empty() {
        0.0
    } else {
        matched.iter().map(|m| m.similarity).sum::<f64>() / matched.len() as f64
    };

    CoverageOutcome {
        score: (match_rate + mean_similarity) / 2.0,
        matches,
    }
}

/// Density: is the answer's length proportionate to the model answer's?
///
/// The word-count ratio is capped at 1.5. Below 0.3 the score ramps
/// linearly up to 0.5; at the cap the score is 0.9; in between it
/// interpolates from 0.7 toward 0.9. An empty expected answer scores the
/// neutral 0.5.
pub fn density(answer_text: &str, expected_answer: &str) -> f64 {
    let answer_words = text::word_count(answer_text) as f64;
    let expected_words = text::word_count(expected_answer) as f64;

    if expected_words == 0.0 {
        return NEUTRAL_DENSITY;
    }

    let ratio = (answer_words / expected_words).min(1.5);

    if ratio < 0.3 {
        ratio / 0.3 * 0.5
    } else if ratio >= 1.5 {
        0.9
    } else {
        0.7 + (ratio - 0.3) * 0.3 / 1.2
    }
}

/// Completeness: how many expected concepts appear among the candidate's
/// concepts, blended with a length-balance term.
pub fn completeness(
    answer_text: &str,
    expected_answer: &str,
    model: &SimilarityModel,
    threshold: f64,
) -> f64 {
    let expected_concepts = concept_set(expected_answer, model);
    if expected_concepts.is_empty() {
        return NEUTRAL_COMPLETENESS;
    }

    let candidate_concepts = concept_set(answer_text, model);
    let candidate_vectors: Vec<TermVector> = candidate_concepts
        .iter()
        .map(|c| model.word_vector(c))
        .collect();

    let covered = expected_concepts
        .iter()
        .filter(|concept| {
            let concept_vector = model.word_vector(concept);
            candidate_vectors
                .iter()
                .any(|cv| cosine_similarity(&concept_vector, cv) >= threshold)
        })
        .count();
    let coverage = covered as f64 / expected_concepts.len() as f64;

    let answer_len = text::word_count(answer_text) as f64;
    let expected_len = text::word_count(expected_answer) as f64;
    let length_ratio = answer_len / expected_len;
    let balance = if (0.5..=2.0).contains(&length_ratio) {
        1.0
    } else {
        0.7
    };

    (coverage + balance) / 2.0
}

/// Concept set of a text: its content-word stems, deduplicated preserving
/// first occurrence.
fn concept_set(input: &str, model: &SimilarityModel) -> Vec<String> {
    let mut concepts = Vec::new();
    for stem in model.stemmed_content_words(input) {
        if !concepts.contains(&stem) {
            concepts.push(stem);
        }
    }
    concepts
}

/// Whole-document similarity between candidate and model answer, clamped
/// into [0, 1].
pub fn content_similarity(answer_text: &str, expected_answer: &str, model: &SimilarityModel) -> f64 {
    model
        .document_similarity(answer_text, expected_answer)
        .clamp(0.0, 1.0)
}

/// Weights for the lexical strategy. At most `coverage` of the marks are
/// attainable through keyword coverage alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalWeights {
    pub coverage: f64,
    pub density: f64,
}

impl Default for LexicalWeights {
    fn default() -> Self {
        Self {
            coverage: 0.7,
            density: 0.3,
        }
    }
}

/// Weights for the semantic strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticWeights {
    pub coverage: f64,
    pub similarity: f64,
    pub completeness: f64,
}

impl Default for SemanticWeights {
    fn default() -> Self {
        Self {
            coverage: 0.4,
            similarity: 0.4,
            completeness: 0.2,
        }
    }
}

/// Combine lexical sub-scores into marks: rounded to two decimals and
/// clamped into [0, max_marks] whatever the configured weights.
pub fn combine_lexical(breakdown: &ScoreBreakdown, weights: &LexicalWeights, max_marks: u32) -> f64 {
    let max_marks = max_marks as f64;
    let marks =
        breakdown.coverage * weights.coverage * max_marks + breakdown.density * weights.density * max_marks;
    round2(marks).clamp(0.0, max_marks)
}

/// Combine semantic sub-scores into marks: rounded to two decimals and
/// clamped into [0, max_marks] whatever the configured weights.
pub fn combine_semantic(
    breakdown: &ScoreBreakdown,
    weights: &SemanticWeights,
    max_marks: u32,
) -> f64 {
    let max_marks = max_marks as f64;
    let weighted = breakdown.coverage * weights.coverage
        + breakdown.content_similarity.unwrap_or(0.0) * weights.similarity
        + breakdown.completeness.unwrap_or(0.0) * weights.completeness;
    round2(weighted * max_marks).clamp(0.0, max_marks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn exact_coverage_counts_substrings() {
        let kws = keywords(&["polymorphism", "objects", "types", "uniformly"]);
        let answer = "Polymorphism is when objects of different types can be treated uniformly.";
        let outcome = exact_coverage(answer, &kws);
        assert_eq!(outcome.score, 1.0);
        assert!(outcome.matches.iter().all(|m| m.matched));
    }

    #[test]
    fn exact_coverage_partial() {
        let kws = keywords(&["stack", "heap", "borrow", "lifetime"]);
        let outcome = exact_coverage("The stack and the heap differ.", &kws);
        assert_eq!(outcome.score, 0.5);
        assert_eq!(outcome.missing_keywords(), vec!["borrow", "lifetime"]);
    }

    #[test]
    fn exact_coverage_empty_keywords_is_neutral() {
        let outcome = exact_coverage("anything at all", &[]);
        assert_eq!(outcome.score, NEUTRAL_EXACT_COVERAGE);
    }

    #[test]
    fn semantic_coverage_empty_keywords_is_neutral() {
        let model = SimilarityModel::new();
        let mut cache = VectorCache::new();
        let outcome = semantic_coverage("anything", &[], &model, 0.6, &mut cache);
        assert_eq!(outcome.score, NEUTRAL_SEMANTIC_COVERAGE);
    }

    #[test]
    fn semantic_coverage_matches_inflected_forms() {
        let model = SimilarityModel::new();
        let mut cache = VectorCache::new();
        let kws = keywords(&["type", "object"]);
        let outcome =
            semantic_coverage("Objects of many types interact.", &kws, &model, 0.6, &mut cache);
        assert_eq!(outcome.score, 1.0);
    }

    #[test]
    fn semantic_coverage_unrelated_answer_scores_low() {
        let model = SimilarityModel::new();
        let mut cache = VectorCache::new();
        let kws = keywords(&["polymorphism", "inheritance"]);
        let outcome = semantic_coverage("Bananas are yellow fruit.", &kws, &model, 0.6, &mut cache);
        assert!(outcome.score < 0.3, "got {}", outcome.score);
        assert_eq!(outcome.missing_keywords().len(), 2);
    }

    #[test]
    fn density_empty_expected_is_neutral() {
        assert_eq!(density("whatever", ""), NEUTRAL_DENSITY);
    }

    #[test]
    fn density_empty_answer_is_zero() {
        assert_eq!(density("", "a model answer with several words"), 0.0);
    }

    #[test]
    fn density_too_short_ramps_linearly() {
        // 1 word against 10 -> ratio 0.1 -> (0.1 / 0.3) * 0.5
        let expected = "one two three four five six seven eight nine ten";
        let score = density("word", expected);
        assert!((score - 0.1 / 0.3 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn density_matching_length_lands_in_adequate_band() {
        let expected = "one two three four five six seven eight nine ten";
        let score = density(expected, expected);
        // ratio 1.0 -> 0.7 + 0.7 * 0.3 / 1.2 = 0.875
        assert!((score - 0.875).abs() < 1e-9);
    }

    #[test]
    fn density_overlong_answer_is_capped() {
        let expected = "one two three";
        let answer = "a very long answer that rambles on for many more words than the model answer";
        assert_eq!(density(answer, expected), 0.9);
    }

    #[test]
    fn completeness_empty_expected_is_neutral() {
        let model = SimilarityModel::new();
        assert_eq!(completeness("any answer", "", &model, 0.6), NEUTRAL_COMPLETENESS);
    }

    #[test]
    fn completeness_full_overlap_scores_high() {
        let model = SimilarityModel::new();
        let expected = "Encapsulation hides internal state behind an interface.";
        let score = completeness(expected, expected, &model, 0.6);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn completeness_unbalanced_length_drops_balance_term() {
        let model = SimilarityModel::new();
        let expected = "Encapsulation hides internal state behind an interface.";
        let answer = format!("{expected} {extra}", extra = "and much more ".repeat(20));
        let score = completeness(&answer, expected, &model, 0.6);
        // concepts all covered but length ratio above 2.0
        assert_eq!(score, (1.0 + 0.7) / 2.0);
    }

    #[test]
    fn content_similarity_clamps_into_unit_interval() {
        let model = SimilarityModel::new();
        let score = content_similarity("totally different words", "expected model answer", &model);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn combine_lexical_weighted_sum() {
        let breakdown = ScoreBreakdown {
            coverage: 1.0,
            density: 0.85,
            content_similarity: None,
            completeness: None,
        };
        let marks = combine_lexical(&breakdown, &LexicalWeights::default(), 10);
        assert_eq!(marks, 9.55);
    }

    #[test]
    fn combine_semantic_weighted_sum() {
        let breakdown = ScoreBreakdown {
            coverage: 0.5,
            density: 0.5,
            content_similarity: Some(0.5),
            completeness: Some(0.5),
        };
        let marks = combine_semantic(&breakdown, &SemanticWeights::default(), 10);
        assert_eq!(marks, 5.0);
    }

    #[test]
    fn combine_never_exceeds_max_marks() {
        let breakdown = ScoreBreakdown {
            coverage: 1.0,
            density: 1.0,
            content_similarity: Some(1.0),
            completeness: Some(1.0),
        };
        // deliberately overweighted configuration
        let weights = LexicalWeights {
            coverage: 0.9,
            density: 0.5,
        };
        let marks = combine_lexical(&breakdown, &weights, 10);
        assert_eq!(marks, 10.0);

        let weights = SemanticWeights {
            coverage: 0.8,
            similarity: 0.8,
            completeness: 0.8,
        };
        let marks = combine_semantic(&breakdown, &weights, 10);
        assert_eq!(marks, 10.0);
    }

    #[test]
    fn round2_two_decimal_places() {
        assert_eq!(round2(9.554), 9.55);
        assert_eq!(round2(9.567), 9.57);
        assert_eq!(round2(10.0 / 3.0), 3.33);
        assert_eq!(round2(0.0), 0.0);
    }
}
