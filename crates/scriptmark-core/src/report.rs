//! Grading result types with JSON persistence.
//!
//! These are transient outputs returned to the caller, who owns
//! persistence of the underlying records. The summary duplicates the
//! figures written onto the submission so it can be archived on its own.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::ScoringStrategy;
use crate::scoring::ScoreBreakdown;

/// Scoring outcome for a single answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// The question this result belongs to.
    pub question_id: String,
    /// Marks awarded, rounded to two decimals.
    pub marks_obtained: f64,
    /// Maximum marks attainable for the question.
    pub marks_allocated: f64,
    /// Sub-score breakdown the marks were aggregated from.
    pub breakdown: ScoreBreakdown,
    /// Generated feedback text.
    pub feedback: String,
    /// The effective keyword set used for coverage (explicit or extracted).
    pub keywords: Vec<String>,
}

/// Aggregate result of grading one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingSummary {
    /// Unique identifier for this grading run.
    pub id: Uuid,
    /// The submission that was graded.
    pub submission_id: String,
    /// Strategy used for every answer in this run.
    pub strategy: ScoringStrategy,
    /// When grading completed. Metadata only; never an input to a score.
    pub graded_at: DateTime<Utc>,
    /// Sum of obtained marks.
    pub obtained_marks: f64,
    /// Sum of allocated marks.
    pub total_marks: f64,
    /// obtained / total * 100, 0 when total is 0.
    pub percentage: f64,
    /// Per-answer breakdown in question order.
    pub answers: Vec<AnswerResult>,
}

impl GradingSummary {
    /// Save the summary as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: GradingSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }
}
