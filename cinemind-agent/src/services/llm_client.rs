//! Language model client (OpenAI-compatible chat completions)
//!
//! Default endpoint is Moonshot (`https://api.moonshot.cn/v1`, model
//! `moonshot-v1-8k`); any service speaking `POST /chat/completions` with a
//! bearer key works.

use async_trait::async_trait;
use cinemind_common::config::LlmConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Language model client errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Language model API key not configured")]
    NotConfigured,

    #[error("Language model request failed: {0}")]
    Network(String),

    #[error("Language model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse language model response: {0}")]
    Parse(String),

    #[error("Language model returned no content")]
    EmptyResponse,
}

impl LlmError {
    /// Transport failures, rate limiting and server errors are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Producer of review prose
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Complete a conversation, returning the assistant text
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP chat completions client
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    retry_delay: Duration,
}

impl LlmClient {
    /// Build a client from the `[llm]` configuration section
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete_once(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        extract_content(parsed)
    }
}

fn extract_content(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(LlmError::EmptyResponse)
}

#[async_trait]
impl NarrativeGenerator for LlmClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        debug!(model = %self.model, messages = messages.len(), "Requesting completion");
        retry_with_backoff("chat completion", self.max_retries, self.retry_delay, || {
            self.complete_once(messages)
        })
        .await
    }
}

/// Run `operation`, retrying retryable failures with linear back-off
///
/// Attempt `n` (1-based) that fails waits `base_delay × n` before the next
/// try; at most `max_retries` retries follow the first attempt.
pub async fn retry_with_backoff<F, Fut, T>(
    operation_name: &str,
    max_retries: u32,
    base_delay: Duration,
    mut operation: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() && attempt <= max_retries => {
                let delay = base_delay * attempt;
                warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying after failure"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_blank_key_is_not_configured() {
        let result = LlmClient::new(&LlmConfig::default(), "");
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::Network("reset".into()).is_retryable());
        assert!(LlmError::Api { status: 429, message: String::new() }.is_retryable());
        assert!(LlmError::Api { status: 503, message: String::new() }.is_retryable());
        assert!(!LlmError::Api { status: 401, message: String::new() }.is_retryable());
        assert!(!LlmError::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_extract_content() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant", "content": "  影评正文 "}}]}"#)
                .unwrap();
        assert_eq!(extract_content(response).unwrap(), "影评正文");

        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(extract_content(response), Err(LlmError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff("test", 2, Duration::from_millis(1), || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    Err(LlmError::Network("timeout".into()))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), LlmError> = retry_with_backoff("test", 2, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(LlmError::Api { status: 500, message: "boom".into() }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<(), LlmError> = retry_with_backoff("test", 5, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(LlmError::Api { status: 401, message: "bad key".into() }) }
        })
        .await;

        assert!(matches!(result, Err(LlmError::Api { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
