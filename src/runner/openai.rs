//! OpenAI chat-completions runner with automatic retry for transient errors.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{classify_http_status, RetryConfig, RunnerError, RunnerErrorKind};
use super::TaskRunner;
use crate::pipeline::AgentSpec;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-backed runner.
///
/// One chat completion per task: the agent persona becomes the system
/// message, the resolved task prompt the user message. Transient failures
/// (429, 5xx, network) are retried here with backoff; nothing upstream
/// retries.
pub struct OpenAiRunner {
    client: Client,
    api_key: String,
    default_model: String,
    retry_config: RetryConfig,
}

impl OpenAiRunner {
    /// Create a runner with default retry configuration.
    pub fn new(api_key: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            default_model: default_model.into(),
            retry_config: RetryConfig::default(),
        }
    }

    /// Override the retry configuration.
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Model used for an agent: its own override, else the run default.
    fn model_for(&self, agent: &AgentSpec) -> String {
        agent
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    /// Parse Retry-After header if present.
    fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
        headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok().map(Duration::from_secs))
    }

    /// Create a RunnerError from HTTP response status and body.
    fn create_error(
        status: reqwest::StatusCode,
        body: &str,
        retry_after: Option<Duration>,
    ) -> RunnerError {
        let status_code = status.as_u16();
        match classify_http_status(status_code) {
            RunnerErrorKind::RateLimited => RunnerError::rate_limited(body.to_string(), retry_after),
            RunnerErrorKind::ClientError => RunnerError::client_error(status_code, body.to_string()),
            _ => RunnerError::server_error(status_code, body.to_string()),
        }
    }

    /// Execute a single request without retry.
    async fn execute_request(&self, request: &ChatRequest) -> Result<String, RunnerError> {
        let response = match self
            .client
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(RunnerError::network_error(format!("Request timeout: {e}")));
                } else if e.is_connect() {
                    return Err(RunnerError::network_error(format!("Connection failed: {e}")));
                } else {
                    return Err(RunnerError::network_error(format!("Request failed: {e}")));
                }
            }
        };

        let status = response.status();
        let retry_after = Self::parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Self::create_error(status, &body, retry_after));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            RunnerError::parse_error(format!("Failed to parse response: {e}, body: {body}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RunnerError::parse_error("No choices in response".to_string()))?;

        choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RunnerError::parse_error("Empty completion content".to_string()))
    }

    /// Execute a request with automatic retry for transient errors.
    async fn execute_with_retry(&self, request: &ChatRequest) -> Result<String, RunnerError> {
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            match self.execute_request(request).await {
                Ok(text) => {
                    if attempt > 0 {
                        tracing::info!(
                            "Request succeeded after {} retries (total time: {:?})",
                            attempt,
                            start.elapsed()
                        );
                    }
                    return Ok(text);
                }
                Err(error) => {
                    let should_retry = self.retry_config.should_retry(&error)
                        && attempt < self.retry_config.max_retries;

                    if !should_retry {
                        tracing::error!("Request failed (not retrying): {}", error);
                        return Err(error);
                    }

                    let delay = error.suggested_delay(attempt);
                    let remaining = self
                        .retry_config
                        .max_retry_duration
                        .saturating_sub(start.elapsed());
                    let actual_delay = delay.min(remaining);

                    if actual_delay.is_zero() {
                        tracing::warn!(
                            "Retry attempt {} failed, no time remaining: {}",
                            attempt + 1,
                            error
                        );
                        return Err(error);
                    }

                    tracing::warn!(
                        "Retry attempt {} failed with {}, retrying in {:?}",
                        attempt + 1,
                        error.kind,
                        actual_delay
                    );

                    tokio::time::sleep(actual_delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Assemble the system message for an agent persona.
///
/// Mirrors the conventional crew prompt shape: role, backstory, goal, and the
/// tool capabilities the agent is allowed to lean on.
pub(crate) fn system_prompt(agent: &AgentSpec) -> String {
    let mut prompt = format!(
        "You are {role}. {backstory}\nYour personal goal is: {goal}",
        role = agent.role.trim(),
        backstory = agent.backstory.trim(),
        goal = agent.goal.trim(),
    );
    if !agent.tools.is_empty() {
        let tools: Vec<&str> = agent.tools.iter().map(|t| t.as_str()).collect();
        prompt.push_str(&format!(
            "\nResearch gathered with your tools ({}) is provided in the task context.",
            tools.join(", ")
        ));
    }
    prompt
}

#[async_trait]
impl TaskRunner for OpenAiRunner {
    async fn execute(&self, agent: &AgentSpec, prompt: &str) -> Result<String, RunnerError> {
        let model = self.model_for(agent);
        let request = ChatRequest {
            model: model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(agent),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(0.7),
        };

        tracing::debug!(agent = %agent.name, model = %model, "sending chat completion");
        self.execute_with_retry(&request).await
    }
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
