//! Rule-based feedback synthesis.
//!
//! Output is a pure function of the sub-scores and the keyword matches:
//! one templated sentence per relevant sub-score, selected by threshold
//! bucket, joined with single spaces. No randomness.

use crate::scoring::{CoverageOutcome, ScoreBreakdown};

/// Maximum number of missing keywords quoted back as a suggestion.
const MAX_SUGGESTED_KEYWORDS: usize = 3;

/// Feedback for the lexical strategy: coverage and density sentences.
pub fn lexical_feedback(coverage: &CoverageOutcome, breakdown: &ScoreBreakdown) -> String {
    let mut parts = Vec::new();
    push_coverage_sentences(coverage, breakdown.coverage, &mut parts);
    parts.push(density_sentence(breakdown.density));
    parts.join(" ")
}

/// Feedback for the semantic strategy: coverage, density, similarity, and
/// completeness sentences.
pub fn semantic_feedback(coverage: &CoverageOutcome, breakdown: &ScoreBreakdown) -> String {
    let mut parts = Vec::new();
    push_coverage_sentences(coverage, breakdown.coverage, &mut parts);
    parts.push(density_sentence(breakdown.density));
    if let Some(similarity) = breakdown.content_similarity {
        parts.push(similarity_sentence(similarity));
    }
    if let Some(completeness) = breakdown.completeness {
        parts.push(completeness_sentence(completeness));
    }
    parts.join(" ")
}

fn push_coverage_sentences(
    coverage: &CoverageOutcome,
    score: f64,
    parts: &mut Vec<String>,
) {
    if score >= 0.7 {
        parts.push("Excellent coverage of key concepts.".to_string());
    } else if score >= 0.5 {
        parts.push(
            "Good coverage of main points, but some key concepts are missing.".to_string(),
        );
    } else {
        parts.push("Several important concepts are not addressed.".to_string());
        let missing = coverage.missing_keywords();
        if !missing.is_empty() {
            let suggested: Vec<&str> =
                missing.into_iter().take(MAX_SUGGESTED_KEYWORDS).collect();
            parts.push(format!("Consider including: {}.", suggested.join(", ")));
        }
    }
}

fn density_sentence(score: f64) -> String {
    if score >= 0.7 {
        "Answer length and detail are appropriate.".to_string()
    } else if score >= 0.5 {
        "Answer is adequate but could use more supporting detail.".to_string()
    } else {
        "Answer could be more detailed and comprehensive.".to_string()
    }
}

fn similarity_sentence(score: f64) -> String {
    if score >= 0.7 {
        "The answer closely reflects the expected content.".to_string()
    } else if score >= 0.5 {
        "The answer partially reflects the expected content.".to_string()
    } else {
        "The answer diverges from the expected content.".to_string()
    }
}

fn completeness_sentence(score: f64) -> String {
    if score >= 0.7 {
        "All major ideas from the model answer are present.".to_string()
    } else if score >= 0.5 {
        "Some ideas from the model answer are only partially developed.".to_string()
    } else {
        "Several ideas from the model answer are missing.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::KeywordMatch;

    fn outcome(score: f64, missing: &[&str]) -> CoverageOutcome {
        CoverageOutcome {
            score,
            matches: missing
                .iter()
                .map(|k| KeywordMatch {
                    keyword: k.to_string(),
                    similarity: 0.0,
                    matched: false,
                })
                .collect(),
        }
    }

    fn breakdown(coverage: f64, density: f64) -> ScoreBreakdown {
        ScoreBreakdown {
            coverage,
            density,
            content_similarity: None,
            completeness: None,
        }
    }

    #[test]
    fn strong_answer_gets_positive_feedback() {
        let feedback = lexical_feedback(&outcome(0.9, &[]), &breakdown(0.9, 0.85));
        assert_eq!(
            feedback,
            "Excellent coverage of key concepts. Answer length and detail are appropriate."
        );
    }

    #[test]
    fn weak_coverage_names_missing_keywords() {
        let feedback = lexical_feedback(
            &outcome(0.2, &["borrow", "lifetime", "ownership", "moves"]),
            &breakdown(0.2, 0.85),
        );
        assert!(feedback.contains("Several important concepts are not addressed."));
        // capped at three suggestions
        assert!(feedback.contains("Consider including: borrow, lifetime, ownership."));
        assert!(!feedback.contains("moves"));
    }

    #[test]
    fn weak_coverage_without_keywords_has_no_suggestion() {
        let feedback = lexical_feedback(&outcome(0.3, &[]), &breakdown(0.3, 0.85));
        assert!(!feedback.contains("Consider including"));
    }

    #[test]
    fn empty_answer_notes_insufficient_detail() {
        let feedback = lexical_feedback(&outcome(0.0, &["stack"]), &breakdown(0.0, 0.0));
        assert!(feedback.contains("Answer could be more detailed and comprehensive."));
    }

    #[test]
    fn middling_density_gets_adequate_sentence() {
        let feedback = lexical_feedback(&outcome(0.8, &[]), &breakdown(0.8, 0.6));
        assert!(feedback.contains("adequate but could use more supporting detail"));
    }

    #[test]
    fn semantic_feedback_covers_all_sub_scores() {
        let mut b = breakdown(0.8, 0.85);
        b.content_similarity = Some(0.4);
        b.completeness = Some(0.6);
        let feedback = semantic_feedback(&outcome(0.8, &[]), &b);
        assert!(feedback.contains("Excellent coverage"));
        assert!(feedback.contains("diverges from the expected content"));
        assert!(feedback.contains("only partially developed"));
    }

    #[test]
    fn feedback_is_deterministic() {
        let o = outcome(0.2, &["alpha", "beta"]);
        let b = breakdown(0.2, 0.5);
        assert_eq!(lexical_feedback(&o, &b), lexical_feedback(&o, &b));
    }
}
