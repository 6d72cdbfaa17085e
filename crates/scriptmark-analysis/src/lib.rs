//! scriptmark-analysis — Post-grading qualitative analysis.
//!
//! Implements the `AnalysisProvider` trait for Gemini and Mistral, and the
//! `AnalysisAugmenter` that turns a graded submission into an LLM-written
//! qualitative report. Analysis is strictly optional and never affects the
//! committed numeric grade.

pub mod augmenter;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mistral;
pub mod mock;
pub mod prompt;
pub mod sections;

pub use augmenter::{AnalysisAugmenter, AnalysisOutcome, AnalysisProvider, AnalysisReport};
pub use config::{augmenter_from_config, load_config, AnalysisConfig, ScriptmarkConfig};
pub use error::AnalysisError;
