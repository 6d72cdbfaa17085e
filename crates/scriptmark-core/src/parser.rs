//! Exam bundle parser.
//!
//! A bundle file is the file-based stand-in for the intake workflow: one
//! TOML document holding the exam header, its questions, and a single
//! student submission. Graded bundles round-trip through JSON so the
//! analysis step can run on them later.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Answer, Question, Submission, SubmissionStatus};

/// Questions plus one submission, as loaded from a bundle file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamBundle {
    pub exam_id: String,
    pub exam_title: String,
    pub questions: Vec<Question>,
    pub submission: Submission,
}

/// Intermediate TOML structure for parsing bundle files.
#[derive(Debug, Deserialize)]
struct TomlBundle {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    submission: TomlSubmission,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    expected_answer: String,
    #[serde(default)]
    keywords: Vec<String>,
    marks: u32,
    #[serde(default)]
    order: u32,
}

#[derive(Debug, Deserialize)]
struct TomlSubmission {
    id: String,
    student_id: String,
    #[serde(default)]
    answers: Vec<TomlAnswer>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswer {
    question_id: String,
    text: String,
}

/// Parse a single TOML bundle file.
pub fn parse_bundle(path: &Path) -> Result<ExamBundle> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bundle file: {}", path.display()))?;
    parse_bundle_str(&content, path)
}

/// Parse a TOML string into an `ExamBundle` (useful for testing).
pub fn parse_bundle_str(content: &str, source_path: &Path) -> Result<ExamBundle> {
    let parsed: TomlBundle = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions: Vec<Question> = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, q)| Question {
            id: q.id,
            text: q.text,
            expected_answer: q.expected_answer,
            keywords: q.keywords,
            marks: q.marks,
            // File order stands in when no explicit order is given.
            order: if q.order == 0 { index as u32 + 1 } else { q.order },
        })
        .collect();

    let answers: Vec<Answer> = parsed
        .submission
        .answers
        .into_iter()
        .map(|a| {
            let allocated = questions
                .iter()
                .find(|q| q.id == a.question_id)
                .map(|q| f64::from(q.marks))
                .unwrap_or(0.0);
            Answer {
                id: format!("{}:{}", parsed.submission.id, a.question_id),
                question_id: a.question_id,
                answer_text: a.text,
                marks_obtained: 0.0,
                marks_allocated: allocated,
                feedback: String::new(),
            }
        })
        .collect();

    let total_marks = answers.iter().map(|a| a.marks_allocated).sum();

    Ok(ExamBundle {
        exam_id: parsed.exam.id.clone(),
        exam_title: parsed.exam.title.clone(),
        questions,
        submission: Submission {
            id: parsed.submission.id,
            student_id: parsed.submission.student_id,
            exam_id: parsed.exam.id,
            exam_title: parsed.exam.title,
            answers,
            total_marks,
            obtained_marks: 0.0,
            percentage: 0.0,
            is_graded: false,
            status: SubmissionStatus::Submitted,
        },
    })
}

/// Recursively load all `.toml` bundle files from a directory.
pub fn load_bundle_directory(dir: &Path) -> Result<Vec<ExamBundle>> {
    let mut bundles = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            bundles.extend(load_bundle_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bundle(&path) {
                Ok(bundle) => bundles.push(bundle),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(bundles)
}

/// A warning from bundle validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a bundle for common issues.
pub fn validate_bundle(bundle: &ExamBundle) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question IDs
    let mut seen_ids = std::collections::HashSet::new();
    for question in &bundle.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    // Questions that cannot award marks or have nothing to score against
    for question in &bundle.questions {
        if question.marks == 0 {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "question has zero marks".into(),
            });
        }
        if question.expected_answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "expected answer is empty; density will use its neutral default".into(),
            });
        }
    }

    // Answers referencing unknown questions (grading will reject these)
    for answer in &bundle.submission.answers {
        if !bundle.questions.iter().any(|q| q.id == answer.question_id) {
            warnings.push(ValidationWarning {
                question_id: Some(answer.question_id.clone()),
                message: format!("answer references unknown question: {}", answer.question_id),
            });
        }
    }

    // Unanswered questions
    for question in &bundle.questions {
        if !bundle
            .submission
            .answers
            .iter()
            .any(|a| a.question_id == question.id)
        {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("question {} has no answer in the submission", question.id),
            });
        }
    }

    warnings
}
