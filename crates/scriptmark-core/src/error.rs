//! Grading error taxonomy.
//!
//! Defined as a typed enum so callers can distinguish bad input from a
//! failed scoring resource without string matching. External-service
//! failures are deliberately absent: the analysis augmenter reports them
//! as data, never as grading errors.

use thiserror::Error;

/// Errors the grading engine can surface.
#[derive(Debug, Error)]
pub enum GradingError {
    /// The input records are malformed (e.g. an answer referencing an
    /// unknown question). Surfaced before any scoring writes happen.
    #[error("invalid grading input: {0}")]
    Validation(String),

    /// A scorer cannot execute, typically because a required language
    /// resource is unavailable. Fatal for the current grading call; no
    /// partial marks are committed.
    #[error("scoring failed: {0}")]
    Scoring(String),
}
