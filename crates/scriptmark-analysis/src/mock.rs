//! Mock provider for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::augmenter::{AnalysisProvider, AnalysisReport};
use crate::error::AnalysisError;
use crate::prompt::{self, SubmissionContext};
use crate::sections;

/// A mock analysis provider for exercising the augmenter without real API
/// calls. Returns a canned response run through the real section parser.
pub struct MockAnalyst {
    response: Option<String>,
    call_count: AtomicU32,
    last_prompt: Mutex<Option<String>>,
}

impl MockAnalyst {
    /// A mock that always answers with `response`.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// A mock that always fails with a network error.
    pub fn failing() -> Self {
        Self {
            response: None,
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Number of analyze calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The prompt built for the most recent call.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisProvider for MockAnalyst {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, context: &SubmissionContext) -> Result<AnalysisReport, AnalysisError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_prompt.lock().unwrap() = Some(prompt::build_prompt(context));

        match &self.response {
            Some(response) => Ok(sections::parse_report(response)),
            None => Err(AnalysisError::NetworkError("mock failure".into())),
        }
    }
}
