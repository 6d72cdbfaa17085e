//! The analysis augmenter.
//!
//! Wraps an optional provider and enforces the contract the grading
//! pipeline relies on: analysis runs only on graded submissions, failures
//! come back as data rather than errors, and committed grades are never
//! touched.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use scriptmark_core::model::{Question, Submission};

use crate::error::AnalysisError;
use crate::prompt::SubmissionContext;

/// A structured qualitative report parsed from a provider response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Raw text of the SUMMARY section.
    pub summary: String,
    /// STRENGTHS items.
    pub strengths: Vec<String>,
    /// AREAS FOR IMPROVEMENT items.
    pub areas_for_improvement: Vec<String>,
    /// SUGGESTIONS items.
    pub suggestions: Vec<String>,
    /// The unmodified provider response.
    pub full_analysis: String,
}

/// Result of an analysis attempt. Failure is a value, not an error: the
/// caller has already committed the grade and only needs to know whether
/// commentary is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// The parsed report, when analysis succeeded.
    #[serde(default)]
    pub report: Option<AnalysisReport>,
    /// Human-readable reason when it did not.
    #[serde(default)]
    pub error: Option<String>,
}

impl AnalysisOutcome {
    pub fn success(report: AnalysisReport) -> Self {
        Self {
            report: Some(report),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            report: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.report.is_some()
    }
}

/// An external generative-text backend that can analyze a graded
/// submission. Implementations own their own response parsing.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Produce a qualitative report for a graded submission.
    async fn analyze(&self, context: &SubmissionContext) -> Result<AnalysisReport, AnalysisError>;
}

/// Optional post-grading analysis step. Absence of a provider models the
/// feature being disabled.
pub struct AnalysisAugmenter {
    provider: Option<Arc<dyn AnalysisProvider>>,
}

impl AnalysisAugmenter {
    /// An augmenter backed by a provider.
    pub fn new(provider: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// An augmenter with the feature disabled.
    pub fn disabled() -> Self {
        Self { provider: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Analyze a graded submission.
    ///
    /// Never returns an error: preconditions and provider failures are all
    /// reported through the outcome's `error` field.
    pub async fn analyze_submission(
        &self,
        submission: &Submission,
        questions: &[Question],
    ) -> AnalysisOutcome {
        let Some(provider) = &self.provider else {
            return AnalysisOutcome::failure("analysis is not configured");
        };

        if !submission.is_graded {
            return AnalysisOutcome::failure("Submission must be graded first");
        }

        let context = SubmissionContext::from_submission(submission, questions);

        match provider.analyze(&context).await {
            Ok(report) => AnalysisOutcome::success(report),
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "analysis failed");
                AnalysisOutcome::failure(format!("AI analysis failed: {e}"))
            }
        }
    }
}
