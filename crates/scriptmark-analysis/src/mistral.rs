//! Mistral API provider implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::augmenter::{AnalysisProvider, AnalysisReport};
use crate::error::AnalysisError;
use crate::prompt::{self, SubmissionContext};
use crate::sections;

const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";
const DEFAULT_MODEL: &str = "mistral-medium-latest";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Mistral chat-completions provider.
pub struct MistralProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl MistralProvider {
    pub fn new(api_key: &str, base_url: Option<String>, model: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        }
    }
}

#[derive(Serialize)]
struct MistralRequest {
    model: String,
    messages: Vec<MistralMessage>,
}

#[derive(Serialize)]
struct MistralMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MistralResponse {
    #[serde(default)]
    choices: Vec<MistralChoice>,
}

#[derive(Deserialize)]
struct MistralChoice {
    message: MistralChoiceMessage,
}

#[derive(Deserialize)]
struct MistralChoiceMessage {
    content: String,
}

#[async_trait]
impl AnalysisProvider for MistralProvider {
    fn name(&self) -> &str {
        "mistral"
    }

    #[instrument(skip(self, context), fields(model = %self.model))]
    async fn analyze(&self, context: &SubmissionContext) -> Result<AnalysisReport, AnalysisError> {
        let body = MistralRequest {
            model: self.model.clone(),
            messages: vec![MistralMessage {
                role: "user".to_string(),
                content: prompt::build_prompt(context),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    AnalysisError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(AnalysisError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(AnalysisError::ModelNotFound(self.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::ApiError {
                status,
                message: body,
            });
        }

        let api_response: MistralResponse =
            response.json().await.map_err(|e| AnalysisError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let text = api_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }

        Ok(sections::parse_report(&text))
    }
}
