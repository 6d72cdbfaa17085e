//! Core record types for scriptmark.
//!
//! Questions, answers, and submissions are created by the intake workflow
//! (out of scope here) and only annotated by the grading engine: it writes
//! `Answer::{marks_obtained, feedback}` and
//! `Submission::{obtained_marks, percentage, is_graded, status}` and nothing
//! else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A short-answer or essay question with its model answer.
///
/// Immutable once grading begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for this question.
    pub id: String,
    /// The question text shown to the student.
    pub text: String,
    /// Model answer the candidate answer is scored against.
    pub expected_answer: String,
    /// Keywords used for coverage scoring. May be empty, in which case
    /// keywords are extracted from the expected answer.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Maximum attainable marks for this question.
    pub marks: u32,
    /// Position of the question within the exam.
    #[serde(default)]
    pub order: u32,
}

/// A student's answer to one question within a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Unique identifier for this answer.
    pub id: String,
    /// The question this answer responds to.
    pub question_id: String,
    /// Raw candidate text as submitted.
    pub answer_text: String,
    /// Marks awarded by grading. Invariant: 0 <= marks_obtained <= marks_allocated.
    #[serde(default)]
    pub marks_obtained: f64,
    /// Copy of `Question::marks` at submission time.
    pub marks_allocated: f64,
    /// Generated feedback text. Empty until graded.
    #[serde(default)]
    pub feedback: String,
}

/// Lifecycle state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    InProgress,
    Submitted,
    Graded,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::InProgress => write!(f, "in_progress"),
            SubmissionStatus::Submitted => write!(f, "submitted"),
            SubmissionStatus::Graded => write!(f, "graded"),
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SubmissionStatus::InProgress),
            "submitted" => Ok(SubmissionStatus::Submitted),
            "graded" => Ok(SubmissionStatus::Graded),
            other => Err(format!("unknown submission status: {other}")),
        }
    }
}

fn default_status() -> SubmissionStatus {
    SubmissionStatus::Submitted
}

/// One student's complete submission for an exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Unique identifier for this submission.
    pub id: String,
    /// The student who submitted.
    pub student_id: String,
    /// The exam this submission belongs to.
    pub exam_id: String,
    /// Exam title, carried along for reporting and analysis prompts.
    #[serde(default)]
    pub exam_title: String,
    /// Answers in exam order.
    #[serde(default)]
    pub answers: Vec<Answer>,
    /// Sum of allocated marks across all answers.
    #[serde(default)]
    pub total_marks: f64,
    /// Sum of obtained marks across all answers. Written by grading.
    #[serde(default)]
    pub obtained_marks: f64,
    /// obtained / total * 100, clamped to [0, 100], 0 when total is 0.
    #[serde(default)]
    pub percentage: f64,
    /// Whether grading has completed for this submission.
    #[serde(default)]
    pub is_graded: bool,
    #[serde(default = "default_status")]
    pub status: SubmissionStatus,
}

impl Submission {
    /// Recompute `percentage` from the current mark totals.
    ///
    /// Defined as 0 when `total_marks` is 0; otherwise rounded to two
    /// decimal places and clamped to [0, 100].
    pub fn recalculate_percentage(&mut self) -> f64 {
        self.percentage = if self.total_marks > 0.0 {
            let pct = self.obtained_marks / self.total_marks * 100.0;
            ((pct * 100.0).round() / 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.percentage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission_with_totals(obtained: f64, total: f64) -> Submission {
        Submission {
            id: "sub-1".into(),
            student_id: "student-1".into(),
            exam_id: "exam-1".into(),
            exam_title: "Midterm".into(),
            answers: vec![],
            total_marks: total,
            obtained_marks: obtained,
            percentage: 0.0,
            is_graded: false,
            status: SubmissionStatus::Submitted,
        }
    }

    #[test]
    fn percentage_law() {
        let mut sub = submission_with_totals(7.5, 10.0);
        assert_eq!(sub.recalculate_percentage(), 75.0);

        let mut sub = submission_with_totals(1.0, 3.0);
        assert_eq!(sub.recalculate_percentage(), 33.33);
    }

    #[test]
    fn percentage_zero_total_is_zero() {
        let mut sub = submission_with_totals(0.0, 0.0);
        assert_eq!(sub.recalculate_percentage(), 0.0);
    }

    #[test]
    fn status_display_and_parse() {
        assert_eq!(SubmissionStatus::Graded.to_string(), "graded");
        assert_eq!(
            "submitted".parse::<SubmissionStatus>().unwrap(),
            SubmissionStatus::Submitted
        );
        assert!("done".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn submission_serde_roundtrip() {
        let sub = submission_with_totals(4.0, 10.0);
        let json = serde_json::to_string(&sub).unwrap();
        let deserialized: Submission = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, "sub-1");
        assert_eq!(deserialized.total_marks, 10.0);
        assert_eq!(deserialized.status, SubmissionStatus::Submitted);
    }

    #[test]
    fn answer_defaults_until_graded() {
        let json = r#"{
            "id": "ans-1",
            "question_id": "q1",
            "answer_text": "some answer",
            "marks_allocated": 5.0
        }"#;
        let answer: Answer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.marks_obtained, 0.0);
        assert!(answer.feedback.is_empty());
    }
}
