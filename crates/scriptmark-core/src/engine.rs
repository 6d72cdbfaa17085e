//! The grading orchestrator.
//!
//! A [`GradingEngine`] is configured once with a strategy and owns the
//! language resource that strategy needs. Grading a submission is
//! synchronous and sequential: every answer is scored before anything is
//! written back, so a failure commits no partial marks.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GradingError;
use crate::feedback;
use crate::keywords;
use crate::model::{Answer, Question, Submission, SubmissionStatus};
use crate::report::{AnswerResult, GradingSummary};
use crate::scoring::{self, LexicalWeights, ScoreBreakdown, SemanticWeights, VectorCache};
use crate::similarity::SimilarityModel;

/// Which scoring strategy grades a submission. Selected once per grading
/// run, never per answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// Literal keyword presence plus length heuristics. No language
    /// resource required.
    Lexical,
    /// Stem/trigram similarity for keyword matching, whole-text
    /// similarity, and concept overlap.
    Semantic,
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringStrategy::Lexical => write!(f, "lexical"),
            ScoringStrategy::Semantic => write!(f, "semantic"),
        }
    }
}

impl FromStr for ScoringStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" => Ok(ScoringStrategy::Lexical),
            "semantic" => Ok(ScoringStrategy::Semantic),
            other => Err(format!("unknown scoring strategy: {other}")),
        }
    }
}

/// Configuration for the grading engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Active scoring strategy.
    #[serde(default = "default_strategy")]
    pub strategy: ScoringStrategy,
    /// Similarity threshold above which a keyword or concept counts as
    /// matched (semantic strategy).
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    /// Keyword cap for frequency extraction (lexical strategy).
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
    /// Keyword cap for linguistic extraction (semantic strategy).
    #[serde(default = "default_linguistic_cap")]
    pub linguistic_cap: usize,
    /// Weight set for the lexical strategy.
    #[serde(default)]
    pub lexical_weights: LexicalWeights,
    /// Weight set for the semantic strategy.
    #[serde(default)]
    pub semantic_weights: SemanticWeights,
    /// Optional extra stop-word lexicon for the language resource.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
}

fn default_strategy() -> ScoringStrategy {
    ScoringStrategy::Lexical
}
fn default_match_threshold() -> f64 {
    0.6
}
fn default_max_keywords() -> usize {
    keywords::DEFAULT_FREQUENCY_CAP
}
fn default_linguistic_cap() -> usize {
    keywords::DEFAULT_LINGUISTIC_CAP
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            match_threshold: default_match_threshold(),
            max_keywords: default_max_keywords(),
            linguistic_cap: default_linguistic_cap(),
            lexical_weights: LexicalWeights::default(),
            semantic_weights: SemanticWeights::default(),
            lexicon_path: None,
        }
    }
}

/// The grading orchestrator.
pub struct GradingEngine {
    config: GraderConfig,
    /// Present only for the semantic strategy.
    model: Option<Arc<SimilarityModel>>,
}

impl std::fmt::Debug for GradingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradingEngine")
            .field("config", &self.config)
            .field("model", &self.model.as_ref().map(|_| "<SimilarityModel>"))
            .finish()
    }
}

impl GradingEngine {
    /// Build an engine, constructing the language resource if the
    /// configured strategy needs one.
    pub fn new(config: GraderConfig) -> Result<Self, GradingError> {
        validate_config(&config)?;

        let model = match config.strategy {
            ScoringStrategy::Lexical => None,
            ScoringStrategy::Semantic => {
                let model = match &config.lexicon_path {
                    Some(path) => SimilarityModel::with_lexicon(path).map_err(|e| {
                        GradingError::Scoring(format!(
                            "language resource unavailable ({}): {e}",
                            path.display()
                        ))
                    })?,
                    None => SimilarityModel::new(),
                };
                Some(Arc::new(model))
            }
        };

        Ok(Self { config, model })
    }

    /// Build an engine sharing an already-loaded language resource.
    pub fn with_model(
        config: GraderConfig,
        model: Arc<SimilarityModel>,
    ) -> Result<Self, GradingError> {
        validate_config(&config)?;
        Ok(Self {
            config,
            model: Some(model),
        })
    }

    pub fn config(&self) -> &GraderConfig {
        &self.config
    }

    /// Grade a single answer. Pure: no records are mutated.
    pub fn grade_answer(
        &self,
        answer: &Answer,
        question: &Question,
    ) -> Result<AnswerResult, GradingError> {
        let mut cache = VectorCache::new();
        self.grade_answer_cached(answer, question, &mut cache)
    }

    /// Grade every answer of a submission in question order, then commit
    /// marks, feedback, totals, percentage, and the graded flag.
    ///
    /// All-or-none: any scoring failure leaves the submission untouched.
    pub fn grade_submission(
        &self,
        submission: &mut Submission,
        questions: &[Question],
    ) -> Result<GradingSummary, GradingError> {
        let by_id: HashMap<&str, &Question> =
            questions.iter().map(|q| (q.id.as_str(), q)).collect();

        // Grade in question order regardless of answer insertion order.
        let mut order: Vec<usize> = (0..submission.answers.len()).collect();
        let position = |answer: &Answer| -> Result<u32, GradingError> {
            by_id
                .get(answer.question_id.as_str())
                .map(|q| q.order)
                .ok_or_else(|| {
                    GradingError::Validation(format!(
                        "answer {} references unknown question {}",
                        answer.id, answer.question_id
                    ))
                })
        };
        for answer in &submission.answers {
            position(answer)?;
        }
        order.sort_by_key(|&i| position(&submission.answers[i]).unwrap_or(u32::MAX));

        // Score everything before writing anything back.
        let mut cache = VectorCache::new();
        let mut results: Vec<(usize, AnswerResult)> = Vec::with_capacity(order.len());
        for index in order {
            let answer = &submission.answers[index];
            let question = by_id[answer.question_id.as_str()];
            let result = self.grade_answer_cached(answer, question, &mut cache)?;
            results.push((index, result));
        }

        let obtained: f64 = results.iter().map(|(_, r)| r.marks_obtained).sum();
        let obtained = scoring::round2(obtained);

        for (index, result) in &results {
            let answer = &mut submission.answers[*index];
            answer.marks_obtained = result.marks_obtained;
            answer.feedback = result.feedback.clone();
        }
        submission.obtained_marks = obtained;
        submission.recalculate_percentage();
        submission.is_graded = true;
        submission.status = SubmissionStatus::Graded;

        tracing::info!(
            submission = %submission.id,
            strategy = %self.config.strategy,
            obtained,
            total = submission.total_marks,
            percentage = submission.percentage,
            "submission graded"
        );

        Ok(GradingSummary {
            id: Uuid::new_v4(),
            submission_id: submission.id.clone(),
            strategy: self.config.strategy,
            graded_at: Utc::now(),
            obtained_marks: obtained,
            total_marks: submission.total_marks,
            percentage: submission.percentage,
            answers: results.into_iter().map(|(_, r)| r).collect(),
        })
    }

    fn grade_answer_cached(
        &self,
        answer: &Answer,
        question: &Question,
        cache: &mut VectorCache,
    ) -> Result<AnswerResult, GradingError> {
        let effective_keywords = self.effective_keywords(question)?;

        let (breakdown, coverage_outcome) = match self.config.strategy {
            ScoringStrategy::Lexical => {
                let coverage = scoring::exact_coverage(&answer.answer_text, &effective_keywords);
                let breakdown = ScoreBreakdown {
                    coverage: coverage.score,
                    density: scoring::density(&answer.answer_text, &question.expected_answer),
                    content_similarity: None,
                    completeness: None,
                };
                (breakdown, coverage)
            }
            ScoringStrategy::Semantic => {
                let model = self.model()?;
                let coverage = scoring::semantic_coverage(
                    &answer.answer_text,
                    &effective_keywords,
                    model,
                    self.config.match_threshold,
                    cache,
                );
                let breakdown = ScoreBreakdown {
                    coverage: coverage.score,
                    density: scoring::density(&answer.answer_text, &question.expected_answer),
                    content_similarity: Some(scoring::content_similarity(
                        &answer.answer_text,
                        &question.expected_answer,
                        model,
                    )),
                    completeness: Some(scoring::completeness(
                        &answer.answer_text,
                        &question.expected_answer,
                        model,
                        self.config.match_threshold,
                    )),
                };
                (breakdown, coverage)
            }
        };

        let (marks, feedback_text) = match self.config.strategy {
            ScoringStrategy::Lexical => (
                scoring::combine_lexical(&breakdown, &self.config.lexical_weights, question.marks),
                feedback::lexical_feedback(&coverage_outcome, &breakdown),
            ),
            ScoringStrategy::Semantic => (
                scoring::combine_semantic(
                    &breakdown,
                    &self.config.semantic_weights,
                    question.marks,
                ),
                feedback::semantic_feedback(&coverage_outcome, &breakdown),
            ),
        };

        Ok(AnswerResult {
            question_id: question.id.clone(),
            marks_obtained: marks.min(answer.marks_allocated),
            marks_allocated: answer.marks_allocated,
            breakdown,
            feedback: feedback_text,
            keywords: effective_keywords,
        })
    }

    /// Explicit keywords are normalized but never overridden; extraction
    /// only runs when the question carries none.
    fn effective_keywords(&self, question: &Question) -> Result<Vec<String>, GradingError> {
        let normalized = keywords::normalize_keywords(&question.keywords);
        if !normalized.is_empty() {
            return Ok(normalized);
        }

        Ok(match self.config.strategy {
            ScoringStrategy::Lexical => {
                keywords::extract_frequency(&question.expected_answer, self.config.max_keywords)
            }
            ScoringStrategy::Semantic => keywords::extract_linguistic(
                &question.expected_answer,
                self.config.linguistic_cap,
                self.model()?,
            ),
        })
    }

    fn model(&self) -> Result<&SimilarityModel, GradingError> {
        self.model.as_deref().ok_or_else(|| {
            GradingError::Scoring("semantic strategy requires a language resource".into())
        })
    }
}

fn validate_config(config: &GraderConfig) -> Result<(), GradingError> {
    if !(0.0..=1.0).contains(&config.match_threshold) {
        return Err(GradingError::Validation(format!(
            "match_threshold must be within [0, 1], got {}",
            config.match_threshold
        )));
    }
    if config.max_keywords == 0 || config.linguistic_cap == 0 {
        return Err(GradingError::Validation(
            "keyword caps must be at least 1".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, order: u32, marks: u32, keywords: &[&str], expected: &str) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            expected_answer: expected.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            marks,
            order,
        }
    }

    fn answer(id: &str, question_id: &str, marks_allocated: f64, text: &str) -> Answer {
        Answer {
            id: id.into(),
            question_id: question_id.into(),
            answer_text: text.into(),
            marks_obtained: 0.0,
            marks_allocated,
            feedback: String::new(),
        }
    }

    fn submission(answers: Vec<Answer>) -> Submission {
        let total = answers.iter().map(|a| a.marks_allocated).sum();
        Submission {
            id: "sub-1".into(),
            student_id: "student-1".into(),
            exam_id: "exam-1".into(),
            exam_title: "OOP Basics".into(),
            answers,
            total_marks: total,
            obtained_marks: 0.0,
            percentage: 0.0,
            is_graded: false,
            status: SubmissionStatus::Submitted,
        }
    }

    const POLY_EXPECTED: &str =
        "Polymorphism allows objects of different types to be treated uniformly.";
    const POLY_ANSWER: &str = "Polymorphism is when objects of different types can be treated \
                               uniformly through a common interface.";

    #[test]
    fn lexical_scenario_full_keyword_coverage() {
        let engine = GradingEngine::new(GraderConfig::default()).unwrap();
        let q = question(
            "q1",
            1,
            10,
            &["polymorphism", "objects", "types", "uniformly"],
            POLY_EXPECTED,
        );
        let a = answer("a1", "q1", 10.0, POLY_ANSWER);

        let result = engine.grade_answer(&a, &q).unwrap();
        assert_eq!(result.breakdown.coverage, 1.0);
        assert!(
            (9.5..=10.0).contains(&result.marks_obtained),
            "got {}",
            result.marks_obtained
        );
    }

    #[test]
    fn grade_submission_commits_marks_and_percentage() {
        let engine = GradingEngine::new(GraderConfig::default()).unwrap();
        let questions = vec![
            question("q1", 1, 10, &["polymorphism", "objects"], POLY_EXPECTED),
            question("q2", 2, 5, &["stack", "heap"], "The stack and heap are memory regions."),
        ];
        let mut sub = submission(vec![
            answer("a1", "q1", 10.0, POLY_ANSWER),
            answer("a2", "q2", 5.0, "The stack holds frames; the heap holds allocations."),
        ]);

        let summary = engine.grade_submission(&mut sub, &questions).unwrap();

        assert!(sub.is_graded);
        assert_eq!(sub.status, SubmissionStatus::Graded);
        assert_eq!(summary.answers.len(), 2);
        assert_eq!(sub.obtained_marks, summary.obtained_marks);
        assert_eq!(sub.percentage, summary.percentage);
        for ans in &sub.answers {
            assert!(ans.marks_obtained >= 0.0);
            assert!(ans.marks_obtained <= ans.marks_allocated);
            assert!(!ans.feedback.is_empty());
        }
        let expected_pct = (sub.obtained_marks / sub.total_marks * 100.0 * 100.0).round() / 100.0;
        assert_eq!(sub.percentage, expected_pct);
    }

    #[test]
    fn grading_is_deterministic() {
        let questions = vec![question(
            "q1",
            1,
            10,
            &[],
            "Encapsulation hides internal state behind a public interface.",
        )];
        let make_sub = || {
            submission(vec![answer(
                "a1",
                "q1",
                10.0,
                "Encapsulation is hiding state inside objects behind interfaces.",
            )])
        };

        for config in [
            GraderConfig::default(),
            GraderConfig {
                strategy: ScoringStrategy::Semantic,
                ..GraderConfig::default()
            },
        ] {
            let engine = GradingEngine::new(config).unwrap();
            let mut first = make_sub();
            let mut second = make_sub();
            engine.grade_submission(&mut first, &questions).unwrap();
            engine.grade_submission(&mut second, &questions).unwrap();

            assert_eq!(
                first.answers[0].marks_obtained.to_bits(),
                second.answers[0].marks_obtained.to_bits()
            );
            assert_eq!(first.answers[0].feedback, second.answers[0].feedback);
            assert_eq!(first.percentage.to_bits(), second.percentage.to_bits());
        }
    }

    #[test]
    fn empty_submission_grades_to_zero_percentage() {
        let engine = GradingEngine::new(GraderConfig::default()).unwrap();
        let mut sub = submission(vec![]);

        let summary = engine.grade_submission(&mut sub, &[]).unwrap();

        assert!(sub.is_graded);
        assert_eq!(sub.obtained_marks, 0.0);
        assert_eq!(sub.percentage, 0.0);
        assert_eq!(summary.percentage, 0.0);
    }

    #[test]
    fn unknown_question_fails_without_partial_commit() {
        let engine = GradingEngine::new(GraderConfig::default()).unwrap();
        let questions = vec![question("q1", 1, 10, &["stack"], "About the stack.")];
        let mut sub = submission(vec![
            answer("a1", "q1", 10.0, "The stack."),
            answer("a2", "q-missing", 5.0, "Orphan answer."),
        ]);

        let err = engine.grade_submission(&mut sub, &questions).unwrap_err();
        assert!(matches!(err, GradingError::Validation(_)));
        assert!(!sub.is_graded);
        assert_eq!(sub.obtained_marks, 0.0);
        assert!(sub.answers.iter().all(|a| a.feedback.is_empty()));
    }

    #[test]
    fn answers_are_graded_in_question_order() {
        let engine = GradingEngine::new(GraderConfig::default()).unwrap();
        let questions = vec![
            question("q-late", 2, 5, &["heap"], "About the heap."),
            question("q-early", 1, 5, &["stack"], "About the stack."),
        ];
        // Answers inserted in reverse of question order.
        let mut sub = submission(vec![
            answer("a1", "q-late", 5.0, "The heap."),
            answer("a2", "q-early", 5.0, "The stack."),
        ]);

        let summary = engine.grade_submission(&mut sub, &questions).unwrap();
        assert_eq!(summary.answers[0].question_id, "q-early");
        assert_eq!(summary.answers[1].question_id, "q-late");
    }

    #[test]
    fn explicit_keywords_are_normalized_not_overridden() {
        let engine = GradingEngine::new(GraderConfig::default()).unwrap();
        let q = question(
            "q1",
            1,
            10,
            &["  Polymorphism ", "OBJECTS", ""],
            POLY_EXPECTED,
        );
        let a = answer("a1", "q1", 10.0, POLY_ANSWER);

        let result = engine.grade_answer(&a, &q).unwrap();
        assert_eq!(result.keywords, vec!["polymorphism", "objects"]);
    }

    #[test]
    fn missing_keywords_are_extracted_from_expected_answer() {
        let engine = GradingEngine::new(GraderConfig::default()).unwrap();
        let q = question("q1", 1, 10, &[], POLY_EXPECTED);
        let a = answer("a1", "q1", 10.0, POLY_ANSWER);

        let result = engine.grade_answer(&a, &q).unwrap();
        assert!(!result.keywords.is_empty());
        assert!(result.keywords.contains(&"polymorphism".to_string()));
    }

    #[test]
    fn semantic_strategy_produces_full_breakdown() {
        let config = GraderConfig {
            strategy: ScoringStrategy::Semantic,
            ..GraderConfig::default()
        };
        let engine = GradingEngine::new(config).unwrap();
        let q = question(
            "q1",
            1,
            10,
            &["polymorphism", "objects", "types"],
            POLY_EXPECTED,
        );
        let a = answer("a1", "q1", 10.0, POLY_ANSWER);

        let result = engine.grade_answer(&a, &q).unwrap();
        assert!(result.breakdown.content_similarity.is_some());
        assert!(result.breakdown.completeness.is_some());
        assert!(result.marks_obtained > 5.0, "got {}", result.marks_obtained);
        assert!(result.marks_obtained <= 10.0);
    }

    #[test]
    fn empty_answer_gets_minimum_density_and_feedback() {
        let engine = GradingEngine::new(GraderConfig::default()).unwrap();
        let q = question("q1", 1, 10, &[], POLY_EXPECTED);
        let a = answer("a1", "q1", 10.0, "");

        let result = engine.grade_answer(&a, &q).unwrap();
        assert_eq!(result.breakdown.density, 0.0);
        assert!(result.feedback.contains("more detailed"));
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let config = GraderConfig {
            match_threshold: 1.5,
            ..GraderConfig::default()
        };
        let err = GradingEngine::new(config).unwrap_err();
        assert!(matches!(err, GradingError::Validation(_)));
    }

    #[test]
    fn missing_lexicon_is_a_scoring_error() {
        let config = GraderConfig {
            strategy: ScoringStrategy::Semantic,
            lexicon_path: Some(PathBuf::from("/nonexistent/lexicon.txt")),
            ..GraderConfig::default()
        };
        let err = GradingEngine::new(config).unwrap_err();
        assert!(matches!(err, GradingError::Scoring(_)));
    }

    #[test]
    fn shared_model_can_grade_multiple_submissions() {
        let model = Arc::new(SimilarityModel::new());
        let config = GraderConfig {
            strategy: ScoringStrategy::Semantic,
            ..GraderConfig::default()
        };
        let engine = GradingEngine::with_model(config, Arc::clone(&model)).unwrap();

        let questions = vec![question("q1", 1, 10, &["stack"], "About the stack.")];
        for i in 0..2 {
            let mut sub = submission(vec![answer(
                &format!("a{i}"),
                "q1",
                10.0,
                "The stack grows downward.",
            )]);
            engine.grade_submission(&mut sub, &questions).unwrap();
            assert!(sub.is_graded);
        }
    }
}
