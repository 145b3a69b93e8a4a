//! Hosted-model summarization of cleaned review datasets.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod prompts;

use crate::config::SummarizerConfig;
use crate::error::{ReviewScopeError, ReviewScopeResult};
use crate::model::CanonicalDataset;

/// Chat-completion request body for the hosted model endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<ChatRequestMessage>,
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage {
    role: &'static str,
    content: Vec<ChatContentBlock>,
}

#[derive(Debug, Serialize)]
struct ChatContentBlock {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// A generated pros/cons summary. Model output is passed through unvalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub summary: String,
    pub model_id: String,
    pub review_count: usize,
    pub generated_at: DateTime<Utc>,
}

pub struct Summarizer {
    client: Client,
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(config: &SummarizerConfig) -> ReviewScopeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| ReviewScopeError::summarize(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Summarize a cleaned dataset into pros/cons bullet points.
    ///
    /// Requires `customer_rating` and `review_text` on every record, which
    /// the pipeline guarantees for any cached dataset.
    pub async fn summarize(&self, dataset: &CanonicalDataset) -> ReviewScopeResult<ReviewSummary> {
        if dataset.is_empty() {
            return Err(ReviewScopeError::summarize("no reviews to summarize"));
        }

        let prompt = prompts::build_summary_prompt(dataset);
        debug!("Invoking model {} with {} reviews", self.config.model_id, dataset.len());

        let body = ChatRequest {
            messages: vec![ChatRequestMessage {
                role: "user",
                content: vec![ChatContentBlock {
                    kind: "text",
                    text: prompt,
                }],
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let url = format!(
            "{}/model/{}/invoke",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model_id
        );

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body);
        if let Some(api_key) = self.config.api_key.as_deref() {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ReviewScopeError::summarize(format!("model invocation failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ReviewScopeError::HttpRequest {
                url,
                status: response.status().as_u16(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ReviewScopeError::summarize(format!("bad model response: {}", e)))?;

        let summary = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ReviewScopeError::summarize("model returned no choices"))?;

        info!("Generated summary for {} reviews", dataset.len());
        Ok(ReviewSummary {
            summary,
            model_id: self.config.model_id.clone(),
            review_count: dataset.len(),
            generated_at: Utc::now(),
        })
    }
}
