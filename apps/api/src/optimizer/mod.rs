//! Content optimizer: scores a profile snapshot and suggests improvements.
//!
//! All OpenAI calls go through `OptimizerClient`. Retries on 429 and 5xx
//! with the shared exponential backoff.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::retry::RetryPolicy;

pub mod handlers;
pub mod prompts;

pub const OPENAI_API_BASE: &str = "https://api.openai.com";
pub const MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_SCORE: u32 = 100;

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("Optimizer call exceeded the {0:?} deadline")]
    DeadlineExceeded(Duration),

    #[error("Model returned empty content")]
    EmptyContent,
}

/// Profile fields the optimizer looks at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub display_name: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub work_history: Value,
    #[serde(default)]
    pub projects: Value,
    #[serde(default)]
    pub links: Value,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub field: String,
    pub suggestion: String,
    pub priority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationReport {
    pub score: u32,
    pub summary: String,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OptimizerClient {
    client: Client,
    api_key: String,
    base_url: String,
    policy: RetryPolicy,
}

impl OptimizerClient {
    pub fn new(api_key: String, base_url: &str, policy: RetryPolicy) -> Result<Self, OptimizerError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        })
    }

    pub async fn optimize(
        &self,
        snapshot: &ProfileSnapshot,
    ) -> Result<OptimizationReport, OptimizerError> {
        let profile_json = serde_json::to_string_pretty(snapshot)?;
        let prompt = prompts::build_optimize_prompt(&profile_json);

        let text = tokio::time::timeout(
            self.policy.deadline,
            self.complete(&prompt, prompts::OPTIMIZE_SYSTEM),
        )
        .await
        .map_err(|_| OptimizerError::DeadlineExceeded(self.policy.deadline))??;

        let mut report: OptimizationReport = serde_json::from_str(strip_json_fences(&text))?;
        report.score = report.score.min(MAX_SCORE);
        Ok(report)
    }

    /// Raw chat completion. Returns the first choice's text.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, OptimizerError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.2,
        };

        let mut last_error: Option<OptimizerError> = None;

        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                let delay = self.policy.delay_for(attempt - 1);
                warn!(
                    "Optimizer call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(OptimizerError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("OpenAI API returned {}: {}", status, body);
                last_error = Some(OptimizerError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(OptimizerError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response.json().await?;
            if let Some(usage) = &chat.usage {
                debug!(
                    "Optimizer call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return chat
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|c| !c.trim().is_empty())
                .ok_or(OptimizerError::EmptyContent);
        }

        Err(last_error.unwrap_or(OptimizerError::RetriesExhausted {
            attempts: self.policy.max_attempts,
        }))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}
